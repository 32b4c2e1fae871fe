use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::result::{Error, Result};

/// Read the ordered list of source identifiers from the manifest.
///
/// One identifier per line, surrounding whitespace trimmed, order
/// preserved. Blank lines are kept as empty identifiers: it is the
/// download provider's job to reject them.
pub fn read_identifiers(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|err| {
        Error::filesystem(format!(
            "Could not open manifest {}: {err}",
            path.display()
        ))
    })?;

    let reader = BufReader::new(file);
    let mut identifiers = Vec::new();
    for line in reader.lines() {
        identifiers.push(line?.trim().to_owned());
    }

    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;

    use super::*;

    fn write_manifest(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn preserves_order_and_trims() {
        let file = write_manifest(indoc! {"
            https://example.com/v/first
              https://example.com/v/second\t
            https://example.com/v/third
        "});

        let ids = read_identifiers(file.path()).unwrap();
        assert_eq!(
            ids,
            vec![
                "https://example.com/v/first",
                "https://example.com/v/second",
                "https://example.com/v/third",
            ]
        );
    }

    #[test]
    fn blank_lines_are_kept() {
        let file = write_manifest("first\n\nsecond\n");
        let ids = read_identifiers(file.path()).unwrap();
        assert_eq!(ids, vec!["first", "", "second"]);
    }

    #[test]
    fn missing_manifest_is_a_filesystem_error() {
        let err = read_identifiers(Path::new("no/such/manifest.txt")).unwrap_err();
        assert_eq!(err.stage(), "filesystem");
    }
}
