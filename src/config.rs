use crate::types::BackendKind;
use crate::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ifcb-roi")]
#[command(about = "Service for accessing IFCB ROI images")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "IFCB_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "IFCB_PORT", default_value = "8001")]
    pub port: u16,

    /// Directory tree of raw IFCB bins (selects the bin-directory backend)
    #[arg(long, env = "IFCB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// S3 bucket holding PNG images (selects the object-store backend)
    #[arg(long, env = "S3_BUCKET_NAME")]
    pub bucket: Option<String>,

    /// Custom S3 endpoint URL (MinIO, Ceph, ...); AWS when unset
    #[arg(long, env = "S3_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Key prefix for all objects in the bucket
    #[arg(long, env = "S3_PREFIX", default_value = "")]
    pub prefix: String,

    /// S3 signing region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    pub region: String,

    /// S3 operation timeout in seconds
    #[arg(long, env = "S3_TIMEOUT_SECS", default_value = "30")]
    pub s3_timeout_secs: u64,

    /// Enable CORS for all origins
    #[arg(long, env = "IFCB_CORS", default_value = "true")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Object-store connection values, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub endpoint_url: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub prefix: String,
    pub region: String,
    pub timeout_secs: u64,
}

/// The one backend this process serves from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    ObjectStore(ObjectStoreConfig),
    BinDirectory(PathBuf),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::ObjectStore(_) => BackendKind::ObjectStore,
            BackendConfig::BinDirectory(_) => BackendKind::BinDirectory,
        }
    }
}

impl Config {
    /// Resolve and validate the backend selection.
    pub fn backend(&self) -> Result<BackendConfig> {
        match (&self.data_dir, &self.bucket) {
            (Some(_), Some(_)) => Err(Error::Config(
                "set either IFCB_DATA_DIR or S3_BUCKET_NAME, not both".to_string(),
            )),
            (None, None) => Err(Error::Config(
                "one of IFCB_DATA_DIR or S3_BUCKET_NAME is required".to_string(),
            )),
            (Some(dir), None) => Ok(BackendConfig::BinDirectory(dir.clone())),
            (None, Some(bucket)) => {
                if bucket.is_empty() {
                    return Err(Error::Config("S3_BUCKET_NAME is empty".to_string()));
                }
                let access_key = require(&self.access_key, "S3_ACCESS_KEY")?;
                let secret_key = require(&self.secret_key, "S3_SECRET_KEY")?;

                let endpoint_url = match self.endpoint_url.as_deref() {
                    None | Some("") => None,
                    Some(raw) => {
                        url::Url::parse(raw).map_err(|e| {
                            Error::Config(format!("invalid S3_ENDPOINT_URL {:?}: {}", raw, e))
                        })?;
                        Some(raw.to_string())
                    }
                };

                Ok(BackendConfig::ObjectStore(ObjectStoreConfig {
                    bucket: bucket.clone(),
                    endpoint_url,
                    access_key,
                    secret_key,
                    prefix: self.prefix.trim_end_matches('/').to_string(),
                    region: self.region.clone(),
                    timeout_secs: self.s3_timeout_secs,
                }))
            }
        }
    }
}

fn require(value: &Option<String>, name: &str) -> Result<String> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Config(format!(
            "{} is required with S3_BUCKET_NAME",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8001,
            data_dir: None,
            bucket: None,
            endpoint_url: None,
            access_key: None,
            secret_key: None,
            prefix: String::new(),
            region: "us-east-1".to_string(),
            s3_timeout_secs: 30,
            cors: true,
            log_level: "info".to_string(),
        }
    }

    fn s3_config() -> Config {
        Config {
            bucket: Some("ifcb".to_string()),
            access_key: Some("ak".to_string()),
            secret_key: Some("sk".to_string()),
            ..base_config()
        }
    }

    #[test]
    fn test_bin_directory_backend() {
        let config = Config {
            data_dir: Some(PathBuf::from("/data/ifcb")),
            ..base_config()
        };
        assert_eq!(
            config.backend().unwrap(),
            BackendConfig::BinDirectory(PathBuf::from("/data/ifcb"))
        );
    }

    #[test]
    fn test_object_store_backend() {
        let config = Config {
            endpoint_url: Some("http://minio:9000".to_string()),
            prefix: "ifcb-data/".to_string(),
            ..s3_config()
        };
        let BackendConfig::ObjectStore(s3) = config.backend().unwrap() else {
            panic!("expected object store");
        };
        assert_eq!(s3.bucket, "ifcb");
        assert_eq!(s3.endpoint_url.as_deref(), Some("http://minio:9000"));
        assert_eq!(s3.prefix, "ifcb-data");
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config {
            secret_key: None,
            ..s3_config()
        };
        assert!(matches!(config.backend(), Err(Error::Config(_))));

        let config = Config {
            access_key: Some(String::new()),
            ..s3_config()
        };
        assert!(matches!(config.backend(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = Config {
            endpoint_url: Some("not a url".to_string()),
            ..s3_config()
        };
        assert!(matches!(config.backend(), Err(Error::Config(_))));
    }

    #[test]
    fn test_backend_selection_is_exclusive() {
        assert!(matches!(base_config().backend(), Err(Error::Config(_))));

        let both = Config {
            data_dir: Some(PathBuf::from("/data")),
            ..s3_config()
        };
        assert!(matches!(both.backend(), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::try_parse_from([
            "ifcb-roi",
            "--data-dir",
            "/data/ifcb",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.backend().unwrap().kind(), BackendKind::BinDirectory);
    }
}
