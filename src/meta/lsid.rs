//! Node ID construction.

/// Build a node ID from a type name and index path.
///
/// # Example
/// ```
/// use bioformats::meta::create_lsid;
///
/// assert_eq!(create_lsid("Instrument", &[0]), "Instrument:0");
/// assert_eq!(create_lsid("LightSource", &[0, 2]), "LightSource:0:2");
/// ```
pub fn create_lsid(kind: &str, indices: &[usize]) -> String {
    let mut id = String::from(kind);
    for i in indices {
        id.push(':');
        id.push_str(&i.to_string());
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_lsid() {
        assert_eq!(create_lsid("Experiment", &[]), "Experiment");
        assert_eq!(create_lsid("Filter", &[0, 1]), "Filter:0:1");
    }
}
