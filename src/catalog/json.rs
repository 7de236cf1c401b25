use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::Entry;
use crate::error::{Error, Result};
use crate::num::parse_prefix;

// JSON field -> perf term, only emitted for non-zero values.
const FIELDS: [(&str, &str); 6] = [
    ("UMask", "umask="),
    ("CounterMask", "cmask="),
    ("Invert", "inv="),
    ("AnyThread", "any="),
    ("EdgeDetect", "edge="),
    ("SampleAfterValue", "period="),
];

const MSRS: [(&str, &str); 4] = [
    ("0x3F6", "ldlat="),
    ("0x1A6", "offcore_rsp="),
    ("0x1A7", "offcore_rsp="),
    ("0x3F7", "frontend="),
];

const UNIT_TO_PMU: [(&str, &str); 6] = [
    ("CBO", "cbox"),
    ("QPI LL", "qpi"),
    ("SBO", "sbox"),
    ("IMPH-U", "cbox"),
    // TODO: NCU events need event/umask conversion before they count on cbox.
    ("NCU", "cbox"),
    ("UPI LL", "upi"),
];

fn is_zero(val: &str) -> bool {
    matches!(val, "0" | "0x0" | "0x00")
}

fn cut_comma(val: &str) -> &str {
    val.split(',').next().unwrap_or(val)
}

// Removes trailing dots that look ugly next to the appended annotations.
fn fix_desc(desc: &str) -> String {
    let desc = desc.trim_end();
    desc.strip_suffix('.').unwrap_or(desc).to_owned()
}

fn append(dst: &mut String, sep: &str, s: &str) {
    if !dst.is_empty() {
        dst.push_str(sep);
    }
    dst.push_str(s);
}

/// Reads a JSON event file into catalog entries, in file order.
pub(crate) fn read_file(path: &Path) -> Result<Vec<Entry>> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| Error::Catalog {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    let Value::Array(records) = value else {
        return Err(Error::Catalog {
            path: path.to_owned(),
            reason: "expected top level array".to_owned(),
        });
    };

    let mut warned_msr = false;
    let mut entries = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let Value::Object(obj) = record else {
            return Err(Error::Catalog {
                path: path.to_owned(),
                reason: format!("expected object at index {}", i),
            });
        };
        match normalize(obj, &mut warned_msr) {
            Some(entry) => entries.push(entry),
            None => log::debug!("{:?}: skipping unnamed event at index {}", path, i),
        }
    }
    Ok(entries)
}

fn normalize(obj: &Map<String, Value>, warned_msr: &mut bool) -> Option<Entry> {
    let fields: HashMap<&str, String> = obj
        .iter()
        .filter_map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => (*b as u8).to_string(),
                _ => return None,
            };
            Some((k.as_str(), v))
        })
        .collect();
    let get = |k: &str| fields.get(k).map(String::as_str);
    let nz = |k: &str| get(k).filter(|v| !is_zero(v));

    let name = get("EventName").filter(|s| !s.is_empty())?.to_ascii_lowercase();

    let mut code = get("EventCode").map(parse_prefix).unwrap_or(0);
    if let Some(ext) = get("ExtSel") {
        code |= parse_prefix(ext) << 21;
    }

    let mut event = format!("event={:#x}", code);
    for (field, term) in FIELDS {
        if let Some(val) = nz(field) {
            append(&mut event, ",", &format!("{}{}", term, cut_comma(val)));
        }
    }
    if let Some(index) = nz("MSRIndex") {
        let index = cut_comma(index);
        let msr = MSRS
            .iter()
            .find(|(num, _)| num.eq_ignore_ascii_case(index))
            .map(|(_, term)| *term);
        match (msr, get("MSRValue")) {
            (Some(term), Some(val)) => append(&mut event, ",", &format!("{}{}", term, val)),
            (Some(_), None) => (),
            (None, _) => {
                if !*warned_msr {
                    *warned_msr = true;
                    log::warn!("unknown MSR {} in event file", index);
                }
            }
        }
    }

    let mut desc = get("BriefDescription").map(fix_desc).unwrap_or_default();
    if let Some(errata) = get("Errata").filter(|s| *s != "null") {
        append(&mut desc, ". ", &format!("Spec update: {}", errata));
    }
    if nz("Data_LA").is_some() {
        append(&mut desc, ". ", "Supports address when precise");
    }

    let pmu = get("Unit").map(|unit| {
        UNIT_TO_PMU
            .iter()
            .find(|(json, _)| *json == unit)
            .map(|(_, pmu)| (*pmu).to_owned())
            .unwrap_or_else(|| unit.to_ascii_lowercase())
    });
    if let Some(pmu) = &pmu {
        append(&mut desc, ". ", &format!("Unit: {}", pmu));
    }

    if let Some(pebs) = nz("PEBS") {
        if !desc.contains("(Precise Event)") {
            let note = match pebs {
                "2" => "(Must be precise)",
                _ => "(Precise event)",
            };
            append(&mut desc, " ", note);
        }
    }

    if desc.is_empty() {
        desc = "No description.".to_owned();
    }

    Some(Entry {
        name,
        event,
        desc,
        pmu: pmu.unwrap_or_else(|| "cpu".to_owned()),
    })
}
