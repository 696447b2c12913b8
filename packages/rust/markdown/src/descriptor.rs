//! Course descriptor (`info.md`) parsing.
//!
//! The descriptor's first paragraph holds one `key: value` pair per line:
//!
//! ```text
//! name: Python
//! logo: http://example.com/python.png
//! type: html
//! ```

use std::collections::BTreeMap;

use seeder_shared::{CourseDescriptor, Result, SeederError};
use tracing::debug;

/// Parse a descriptor file into a course record.
///
/// `id` is left empty; it is only filled in from the content service.
/// `default_logo` is used when no `logo` line is present.
pub fn parse_descriptor(content: &str, default_logo: &str) -> Result<CourseDescriptor> {
    let mut fields = parse_fields(content);

    let name = fields
        .remove("name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SeederError::parse("descriptor has no 'name' field"))?;

    let logo = fields
        .remove("logo")
        .filter(|logo| !logo.is_empty())
        .unwrap_or_else(|| default_logo.to_string());

    // `id` comes from the content service only.
    fields.remove("id");

    Ok(CourseDescriptor {
        name,
        id: None,
        logo,
        metadata: fields,
    })
}

/// Split the first paragraph into `key -> value` pairs.
fn parse_fields(content: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    let paragraph = content
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| !line.trim().is_empty());

    for line in paragraph {
        match split_line(line.trim()) {
            Some((key, value)) => {
                fields.insert(key.to_string(), value);
            }
            None => debug!(line, "descriptor line has no ':' separator, ignoring"),
        }
    }

    fields
}

/// Split on the first `": "`; otherwise split on bare `:` and re-join the
/// remaining segments so values such as `http://...` survive.
fn split_line(line: &str) -> Option<(&str, String)> {
    if let Some((key, value)) = line.split_once(": ") {
        return Some((key.trim(), value.trim().to_string()));
    }

    let mut segments = line.split(':');
    let key = segments.next()?;
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        return None;
    }
    Some((key.trim(), rest.join(":").trim().to_string()))
}
