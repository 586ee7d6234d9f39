use serde::Serialize;

/// Body of a successful `/roi-image/{pid}` lookup.
#[derive(Debug, Clone, Serialize)]
pub struct RoiImage {
    pub pid: String,
    #[serde(rename = "bin-pid")]
    pub bin_pid: String,
    #[serde(rename = "content-type")]
    pub content_type: &'static str,
    /// Base64-encoded PNG.
    pub image: String,
}

/// Which backend a deployment serves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    ObjectStore,
    BinDirectory,
}

/// Service info response
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub backend: BackendKind,
    #[serde(rename = "readOnly")]
    pub read_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_image_field_names() {
        let body = serde_json::to_value(RoiImage {
            pid: "D20170512T092752_IFCB010_319".to_string(),
            bin_pid: "D20170512T092752_IFCB010".to_string(),
            content_type: "image/png",
            image: "aGk=".to_string(),
        })
        .unwrap();
        assert_eq!(body["bin-pid"], "D20170512T092752_IFCB010");
        assert_eq!(body["content-type"], "image/png");
        assert_eq!(body["image"], "aGk=");
    }

    #[test]
    fn test_backend_kind_names() {
        assert_eq!(
            serde_json::to_value(BackendKind::BinDirectory).unwrap(),
            "bin-directory"
        );
    }
}
