//! Streaming description patches.
//!
//! Patches re-read the document event by event and re-emit it verbatim
//! except at the patch target, so untouched content survives byte for
//! byte and absent targets fall out as natural no-ops.

use crate::error::{SpawnError, SpawnResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Plugin name carrying the flight stack bridge in static descriptions.
const MAVLINK_PLUGIN: &str = "mavlink_interface";

/// Result of one patch pass over a document.
#[derive(Debug)]
pub struct PatchOutcome {
    /// The rewritten document text.
    pub xml: String,
    /// Number of edits the pass applied; 0 means the document is
    /// unchanged.
    pub matches: usize,
}

/// Set the UDP port on the `mavlink_interface` plugin.
///
/// The port field is inserted if the plugin exists without it. A document
/// with no such plugin is left unchanged (static descriptions without a
/// flight stack bridge are valid).
pub fn set_mavlink_port(xml: &str, port: u16) -> SpawnResult<PatchOutcome> {
    set_child_text(
        xml,
        "plugin",
        Some(MAVLINK_PLUGIN),
        "mavlink_udp_port",
        &port.to_string(),
        true,
    )
}

/// Force `<gravity>0</gravity>` on every link element.
///
/// The field is created if absent and overwritten if present, so applying
/// the patch twice yields the same document as applying it once.
pub fn force_zero_gravity(xml: &str) -> SpawnResult<PatchOutcome> {
    set_child_text(xml, "link", None, "gravity", "0", true)
}

/// Set the text of a named child element inside every matching parent.
///
/// A parent matches on tag name and, when `parent_name` is given, on its
/// `name` attribute. Only parents directly under a model element count;
/// the same element nested deeper (or inside a nested model) is left
/// alone. When `insert_missing` is set, a matched parent lacking the
/// child gets it appended before the parent's closing tag.
pub(crate) fn set_child_text(
    xml: &str,
    parent_tag: &str,
    parent_name: Option<&str>,
    child: &str,
    value: &str,
    insert_missing: bool,
) -> SpawnResult<PatchOutcome> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    // Depth of the enclosing model element and of the matched parent
    // element, while we are inside them.
    let mut model: Option<usize> = None;
    let mut inside: Option<usize> = None;
    let mut child_done = false;
    let mut matches = 0usize;

    loop {
        match reader.read_event().map_err(read_err)? {
            Event::Start(e) => {
                depth += 1;
                if model.is_none() && e.name().as_ref() == b"model" {
                    model = Some(depth);
                    writer.write_event(Event::Start(e))?;
                } else if inside.is_none()
                    && model == Some(depth - 1)
                    && e.name().as_ref() == parent_tag.as_bytes()
                    && name_matches(&e, parent_name)?
                {
                    inside = Some(depth);
                    child_done = false;
                    writer.write_event(Event::Start(e))?;
                } else if inside == Some(depth - 1) && e.name().as_ref() == child.as_bytes() {
                    // Direct child of the matched parent: replace its
                    // content wholesale.
                    writer.write_event(Event::Start(e))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    skip_to_end(&mut reader)?;
                    writer.write_event(Event::End(BytesEnd::new(child)))?;
                    depth -= 1;
                    child_done = true;
                    matches += 1;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                if inside == Some(depth) && e.name().as_ref() == child.as_bytes() {
                    writer.write_event(Event::Start(e.clone()))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    writer.write_event(Event::End(BytesEnd::new(child)))?;
                    child_done = true;
                    matches += 1;
                } else if inside.is_none()
                    && model == Some(depth)
                    && e.name().as_ref() == parent_tag.as_bytes()
                    && name_matches(&e, parent_name)?
                {
                    // Self-closing parent has no children; expand it if we
                    // need to insert one, otherwise leave it untouched.
                    if insert_missing {
                        writer.write_event(Event::Start(e))?;
                        write_text_element(&mut writer, child, value)?;
                        writer.write_event(Event::End(BytesEnd::new(parent_tag)))?;
                        matches += 1;
                    } else {
                        writer.write_event(Event::Empty(e))?;
                    }
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                if inside == Some(depth) {
                    if !child_done && insert_missing {
                        write_text_element(&mut writer, child, value)?;
                        matches += 1;
                    }
                    inside = None;
                } else if model == Some(depth) {
                    model = None;
                }
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    finish(writer, matches)
}

/// Rename a child element inside every matching parent by rewriting its
/// `name` attribute. Parents match only directly under a model element;
/// other attributes pass through untouched.
pub(crate) fn rename_child(
    xml: &str,
    parent_tag: &str,
    parent_name: &str,
    child_tag: &str,
    child_name: &str,
    new_name: &str,
) -> SpawnResult<PatchOutcome> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut model: Option<usize> = None;
    let mut inside: Option<usize> = None;
    let mut matches = 0usize;

    loop {
        match reader.read_event().map_err(read_err)? {
            Event::Start(e) => {
                depth += 1;
                if model.is_none() && e.name().as_ref() == b"model" {
                    model = Some(depth);
                    writer.write_event(Event::Start(e))?;
                } else if inside.is_none()
                    && model == Some(depth - 1)
                    && e.name().as_ref() == parent_tag.as_bytes()
                    && name_matches(&e, Some(parent_name))?
                {
                    inside = Some(depth);
                    writer.write_event(Event::Start(e))?;
                } else if inside == Some(depth - 1)
                    && e.name().as_ref() == child_tag.as_bytes()
                    && name_matches(&e, Some(child_name))?
                {
                    matches += 1;
                    writer.write_event(Event::Start(with_name(&e, child_tag, new_name)?))?;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                if inside == Some(depth)
                    && e.name().as_ref() == child_tag.as_bytes()
                    && name_matches(&e, Some(child_name))?
                {
                    matches += 1;
                    writer.write_event(Event::Empty(with_name(&e, child_tag, new_name)?))?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                if inside == Some(depth) {
                    inside = None;
                } else if model == Some(depth) {
                    model = None;
                }
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    finish(writer, matches)
}

/// Whether the element's `name` attribute matches the wanted name.
/// `None` matches any element of the right tag.
fn name_matches(e: &BytesStart<'_>, wanted: Option<&str>) -> SpawnResult<bool> {
    let Some(wanted) = wanted else {
        return Ok(true);
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SpawnError::MalformedDescription(err.to_string()))?;
        if attr.key.as_ref() == b"name" {
            let value = attr
                .unescape_value()
                .map_err(|err| SpawnError::MalformedDescription(err.to_string()))?;
            return Ok(value == wanted);
        }
    }
    Ok(false)
}

/// Copy of an element's start tag with the `name` attribute replaced.
fn with_name<'a>(
    e: &BytesStart<'_>,
    tag: &'a str,
    new_name: &'a str,
) -> SpawnResult<BytesStart<'a>> {
    let mut out = BytesStart::new(tag);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SpawnError::MalformedDescription(err.to_string()))?;
        if attr.key.as_ref() == b"name" {
            out.push_attribute(("name", new_name));
        } else {
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| SpawnError::MalformedDescription(err.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| SpawnError::MalformedDescription(err.to_string()))?
                .into_owned();
            out.push_attribute((key.as_str(), value.as_str()));
        }
    }
    Ok(out)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> SpawnResult<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Discard events until the element we are positioned inside closes.
fn skip_to_end(reader: &mut Reader<&[u8]>) -> SpawnResult<()> {
    let mut depth = 1usize;
    loop {
        match reader.read_event().map_err(read_err)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(SpawnError::MalformedDescription(
                    "unexpected end of document inside element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

fn read_err(err: quick_xml::Error) -> SpawnError {
    SpawnError::MalformedDescription(err.to_string())
}

fn finish(writer: Writer<Vec<u8>>, matches: usize) -> SpawnResult<PatchOutcome> {
    let xml = String::from_utf8(writer.into_inner())
        .map_err(|err| SpawnError::MalformedDescription(err.to_string()))?;
    Ok(PatchOutcome { xml, matches })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIC_SDF: &str = r#"<?xml version="1.0"?>
<sdf version="1.5">
  <model name="iris">
    <link name="base_link">
      <gravity>1</gravity>
    </link>
    <link name="rotor_0"/>
    <plugin name="mavlink_interface" filename="libmavlink_interface.so">
      <mavlink_udp_port>14560</mavlink_udp_port>
    </plugin>
    <plugin name="gps_plugin" filename="libgps.so"/>
  </model>
</sdf>"#;

    #[test]
    fn test_port_patch_replaces_existing_value() {
        let outcome = set_mavlink_port(STATIC_SDF, 14563).unwrap();
        assert_eq!(outcome.matches, 1);
        assert!(outcome.xml.contains("<mavlink_udp_port>14563</mavlink_udp_port>"));
        assert!(!outcome.xml.contains("14560"));
    }

    #[test]
    fn test_port_patch_leaves_other_plugins_alone() {
        let outcome = set_mavlink_port(STATIC_SDF, 14563).unwrap();
        assert!(outcome.xml.contains(r#"<plugin name="gps_plugin" filename="libgps.so"/>"#));
    }

    #[test]
    fn test_port_patch_inserts_missing_field() {
        let xml = r#"<sdf><model name="m"><plugin name="mavlink_interface"></plugin></model></sdf>"#;
        let outcome = set_mavlink_port(xml, 14561).unwrap();
        assert_eq!(outcome.matches, 1);
        assert!(outcome.xml.contains("<mavlink_udp_port>14561</mavlink_udp_port>"));
    }

    #[test]
    fn test_port_patch_without_plugin_is_noop() {
        let xml = r#"<sdf><model name="m"><link name="base_link"/></model></sdf>"#;
        let outcome = set_mavlink_port(xml, 14561).unwrap();
        assert_eq!(outcome.matches, 0);
        assert_eq!(outcome.xml, xml);
    }

    #[test]
    fn test_zero_gravity_overwrites_and_inserts() {
        let outcome = force_zero_gravity(STATIC_SDF).unwrap();
        assert_eq!(outcome.matches, 2);
        assert!(!outcome.xml.contains("<gravity>1</gravity>"));
        assert_eq!(outcome.xml.matches("<gravity>0</gravity>").count(), 2);
    }

    #[test]
    fn test_zero_gravity_is_idempotent() {
        let once = force_zero_gravity(STATIC_SDF).unwrap();
        let twice = force_zero_gravity(&once.xml).unwrap();
        assert_eq!(once.xml, twice.xml);
    }

    #[test]
    fn test_port_patch_ignores_nested_plugin() {
        let xml = concat!(
            r#"<sdf><model name="m"><link name="l"><sensor name="s">"#,
            r#"<plugin name="mavlink_interface"><mavlink_udp_port>1</mavlink_udp_port></plugin>"#,
            r#"</sensor></link></model></sdf>"#,
        );
        let outcome = set_mavlink_port(xml, 14561).unwrap();
        assert_eq!(outcome.matches, 0);
        assert_eq!(outcome.xml, xml);
    }

    #[test]
    fn test_zero_gravity_skips_nested_model_links() {
        let xml = concat!(
            r#"<sdf><model name="outer"><link name="base"/>"#,
            r#"<model name="inner"><link name="inner_link"/></model>"#,
            r#"</model></sdf>"#,
        );
        let outcome = force_zero_gravity(xml).unwrap();
        assert_eq!(outcome.matches, 1);
        assert!(outcome.xml.contains(r#"<link name="base"><gravity>0</gravity></link>"#));
        assert!(outcome.xml.contains(r#"<link name="inner_link"/>"#));
    }

    #[test]
    fn test_self_closing_parent_without_insert_is_unmatched_noop() {
        let xml = r#"<sdf><model name="m"><plugin name="gimbal_controller"/></model></sdf>"#;
        let outcome = set_child_text(
            xml,
            "plugin",
            Some("gimbal_controller"),
            "gimbal_imu",
            "imu",
            false,
        )
        .unwrap();
        assert_eq!(outcome.matches, 0);
        assert_eq!(outcome.xml, xml);
    }

    #[test]
    fn test_rename_child_rewrites_name_attribute() {
        let xml = r#"<model><link name="cgo3_camera_link"><sensor name="camera_imu" type="imu"><always_on>1</always_on></sensor></link></model>"#;
        let outcome = rename_child(
            xml,
            "link",
            "cgo3_camera_link",
            "sensor",
            "camera_imu",
            "typhoon_h480_1::camera_imu",
        )
        .unwrap();
        assert_eq!(outcome.matches, 1);
        assert!(outcome.xml.contains(r#"<sensor name="typhoon_h480_1::camera_imu" type="imu">"#));
        assert!(outcome.xml.contains("<always_on>1</always_on>"));
    }

    #[test]
    fn test_rename_child_ignores_other_links() {
        let xml = r#"<model><link name="base_link"><sensor name="camera_imu"/></link></model>"#;
        let outcome = rename_child(
            xml,
            "link",
            "cgo3_camera_link",
            "sensor",
            "camera_imu",
            "renamed",
        )
        .unwrap();
        assert_eq!(outcome.matches, 0);
        assert_eq!(outcome.xml, xml);
    }
}
