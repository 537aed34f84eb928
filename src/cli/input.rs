use std::io::Read;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::Result;
use crate::models::file::FileSubmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Auto,
    Json,
    Yaml,
}

/// A submission document: one record or a list of them. Records stay
/// undecoded here so that each one fails on its own.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Submissions {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value),
}

impl Submissions {
    /// Decode a single-record document.
    pub fn one(value: serde_json::Value) -> Result<FileSubmission> {
        FileSubmission::from_value(value)
    }
}

/// Read submissions from a file, or stdin when `input` is `-`.
pub fn read_submissions(input: &str, format: InputFormat) -> Result<Submissions> {
    let (content, format) = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        (buf, resolve(format, None))
    } else {
        let path = Path::new(input);
        (std::fs::read_to_string(path)?, resolve(format, Some(path)))
    };
    parse_submissions(&content, format)
}

fn resolve(format: InputFormat, path: Option<&Path>) -> InputFormat {
    match format {
        InputFormat::Auto => match path.and_then(Path::extension).and_then(|e| e.to_str()) {
            Some("json") => InputFormat::Json,
            _ => InputFormat::Yaml,
        },
        explicit => explicit,
    }
}

pub fn parse_submissions(content: &str, format: InputFormat) -> Result<Submissions> {
    Ok(match format {
        InputFormat::Json => serde_json::from_str(content)?,
        InputFormat::Yaml | InputFormat::Auto => serde_yaml_ng::from_str(content)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_object_is_one() {
        let parsed = parse_submissions(
            r#"{"path":"/a.tf","repo":"iac","file_metadata":{"lines":10}}"#,
            InputFormat::Json,
        )
        .unwrap();
        match parsed {
            Submissions::One(value) => {
                let sub = Submissions::one(value).unwrap();
                assert_eq!(sub.path.as_deref(), Some("/a.tf"));
                assert_eq!(sub.metadata["lines"], 10);
            }
            Submissions::Many(_) => panic!("expected one"),
        }
    }

    #[test]
    fn yaml_list_is_many() {
        let parsed = parse_submissions(
            "- path: /a.tf\n  tags: [azure]\n- path: /b.tf\n",
            InputFormat::Yaml,
        )
        .unwrap();
        match parsed {
            Submissions::Many(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0]["tags"][0], "azure");
            }
            Submissions::One(_) => panic!("expected many"),
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            resolve(InputFormat::Auto, Some(Path::new("files.json"))),
            InputFormat::Json
        );
        assert_eq!(
            resolve(InputFormat::Auto, Some(Path::new("files.yml"))),
            InputFormat::Yaml
        );
        assert_eq!(resolve(InputFormat::Auto, None), InputFormat::Yaml);
        assert_eq!(
            resolve(InputFormat::Json, Some(Path::new("files.yml"))),
            InputFormat::Json
        );
    }

    #[test]
    fn wrong_typed_list_item_is_kept_for_per_record_failure() {
        let parsed = parse_submissions(
            r#"[{"path":"/a.tf"},{"path":"/b.tf","tags":"oops"}]"#,
            InputFormat::Json,
        )
        .unwrap();
        match parsed {
            Submissions::Many(items) => assert_eq!(items.len(), 2),
            Submissions::One(_) => panic!("expected many"),
        }
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(parse_submissions("{not json", InputFormat::Json).is_err());
    }
}
