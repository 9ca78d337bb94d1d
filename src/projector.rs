//! Deterministic extraction of a flat attribute set from a nested JSON
//! record, per the path grammar configured on a [`SourceConfig`].

use serde_json::Value;
use tracing::trace;

use crate::config::source::SourceConfig;

/// Flat alias → value mapping produced from one raw record.
pub type Envelope = serde_json::Map<String, Value>;

/// Parses `raw` as JSON and extracts the aliases named in `config.key_aliases`.
///
/// Returns `None` if the payload isn't valid JSON, or if any configured path
/// is missing from the record (all-or-nothing: a single missing path drops
/// the whole record rather than yielding a partial envelope). An empty
/// `key_aliases` map yields `Some(Envelope::new())`, which callers treat as
/// a drop since it carries nothing to schedule.
pub fn project(config: &SourceConfig, raw: &[u8]) -> Option<Envelope> {
    let root: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(_) => {
            trace!("record is not valid JSON, dropping");
            return None;
        }
    };

    let mut envelope = Envelope::new();
    for (path, alias) in &config.key_aliases {
        let segments: Vec<&str> = path.split(config.key_sep.as_str()).collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            trace!(path = %path, "ill-formed path, dropping record");
            return None;
        }

        let mut cursor = &root;
        for segment in &segments {
            match cursor.as_object().and_then(|obj| obj.get(*segment)) {
                Some(next) => cursor = next,
                None => {
                    trace!(path = %path, segment = %segment, "subkey missing from record, dropping");
                    return None;
                }
            }
        }
        envelope.insert(alias.clone(), cursor.clone());
    }

    trace!(aliases = envelope.len(), "record parsed");
    Some(envelope)
}
