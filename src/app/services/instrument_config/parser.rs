//! xmlcon document parsing
//!
//! Walks the `SBE_InstrumentConfiguration/Instrument/SensorArray` tree
//! and collects, for each sensor entry, its family element plus every
//! numeric leaf element as a named coefficient. Coefficient blocks that
//! appear more than once (conductivity carries one per equation variant)
//! are collected in document order, so the later block wins.

use super::{InstrumentConfig, SensorDescriptor, SensorType};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Load and parse an xmlcon instrument configuration file
pub fn load(path: &Path) -> Result<InstrumentConfig> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read xmlcon {}", display), e))?;
    parse_str(&text, &display)
}

/// Parse an xmlcon document from a string
pub fn parse_str(xml: &str, source: &str) -> Result<InstrumentConfig> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|e| Error::xml_config(source, "malformed xmlcon document", Some(e)))?;

    let instrument = document
        .descendants()
        .find(|n| n.has_tag_name("Instrument"))
        .ok_or_else(|| Error::xml_config(source, "no Instrument element", None))?;

    let name = child_text(&instrument, "Name")
        .ok_or_else(|| Error::xml_config(source, "Instrument has no Name", None))?;

    let external_voltage_channels =
        child_text(&instrument, "ExternalVoltageChannels").and_then(|t| t.parse().ok());

    let mut sensors = Vec::new();
    if let Some(array) = instrument
        .descendants()
        .find(|n| n.has_tag_name("SensorArray"))
    {
        for (position, sensor_node) in array
            .children()
            .filter(|n| n.has_tag_name("Sensor"))
            .enumerate()
        {
            // the array index attribute is authoritative when present
            let channel = sensor_node
                .attribute("index")
                .and_then(|v| v.parse().ok())
                .unwrap_or(position);

            let Some(type_node) = sensor_node.children().find(|n| n.is_element()) else {
                debug!("sensor entry {} in {} has no type element", channel, source);
                continue;
            };

            let element_name = type_node.tag_name().name().to_string();
            let sensor_type = SensorType::from_element_name(&element_name);
            if sensor_type == SensorType::Unknown {
                warn!("unknown sensor element '{}' in {}", element_name, source);
            }

            let mut coefficients = HashMap::new();
            collect_numeric_leaves(&type_node, &mut coefficients);

            sensors.push(SensorDescriptor {
                channel,
                sensor_type,
                element_name,
                serial_number: child_text(&type_node, "SerialNumber"),
                coefficients,
            });
        }
    }

    debug!(
        "parsed {}: '{}', {} sensors",
        source,
        name,
        sensors.len()
    );

    Ok(InstrumentConfig {
        name,
        external_voltage_channels,
        sensors,
        source: source.to_string(),
    })
}

/// Trimmed text of a direct child element
fn child_text(node: &roxmltree::Node, tag: &str) -> Option<String> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Recursively collect every element whose text parses as a float
fn collect_numeric_leaves(node: &roxmltree::Node, out: &mut HashMap<String, f64>) {
    for child in node.children().filter(|n| n.is_element()) {
        if let Some(value) = child.text().map(str::trim).and_then(|t| t.parse::<f64>().ok()) {
            out.insert(child.tag_name().name().to_string(), value);
        }
        collect_numeric_leaves(&child, out);
    }
}
