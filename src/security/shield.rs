use super::RequestMeta;

/// Request-inspection patterns covering the common probe families:
/// path traversal, script injection, SQL injection, null bytes.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    "../",
    "..\\",
    "<script",
    "union select",
    "' or '",
    "%00",
    "/etc/passwd",
    "cmd.exe",
];

/// True when the path or query smells like an attack probe.
pub fn inspect(meta: &RequestMeta) -> bool {
    let mut target = meta.path.to_lowercase();
    if let Some(query) = &meta.query {
        target.push('?');
        target.push_str(&query.to_lowercase());
    }
    SUSPICIOUS_PATTERNS.iter().any(|p| target.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::test_meta;

    #[test]
    fn clean_requests_pass() {
        assert!(!inspect(&test_meta("1.1.1.1", None, "/api/users")));
        assert!(!inspect(&test_meta("1.1.1.1", None, "/health")));
    }

    #[test]
    fn path_traversal_trips_the_shield() {
        assert!(inspect(&test_meta("1.1.1.1", None, "/files/../../etc/passwd")));
    }

    #[test]
    fn injection_probes_trip_the_shield() {
        let mut meta = test_meta("1.1.1.1", None, "/api/users");
        meta.query = Some("q=1 UNION SELECT password_hash FROM users".into());
        assert!(inspect(&meta));

        let mut meta = test_meta("1.1.1.1", None, "/api/users");
        meta.query = Some("name=<script>alert(1)</script>".into());
        assert!(inspect(&meta));
    }
}
