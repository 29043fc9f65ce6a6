use satprep_core::image_key::DEFAULT_KEY_PREFIX;

/// Object storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding question images.
    pub bucket: String,
    /// AWS region of the bucket.
    pub region: String,
    /// Custom endpoint for S3-compatible servers (MinIO, R2, ...).
    pub endpoint: Option<String>,
    /// Base URL used to build object locations. Derived from the bucket,
    /// region and endpoint when unset.
    pub public_base_url: Option<String>,
    /// Folder that every image key lives under.
    pub key_prefix: String,
    /// Static credentials; the default AWS provider chain is used when unset.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `S3_BUCKET`            | required                   |
    /// | `S3_REGION`            | `AWS_REGION` or `us-east-1`|
    /// | `S3_ENDPOINT`          | unset                      |
    /// | `S3_PUBLIC_BASE_URL`   | derived                    |
    /// | `S3_KEY_PREFIX`        | `questions`                |
    /// | `S3_ACCESS_KEY_ID`     | unset                      |
    /// | `S3_SECRET_ACCESS_KEY` | unset                      |
    /// | `S3_FORCE_PATH_STYLE`  | `false`                    |
    pub fn from_env() -> Self {
        let bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set");

        let region = std::env::var("S3_REGION")
            .or_else(|_| std::env::var("AWS_REGION"))
            .unwrap_or_else(|_| "us-east-1".into());

        let key_prefix = std::env::var("S3_KEY_PREFIX")
            .map(|p| p.trim_matches('/').to_string())
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.into());

        let force_path_style: bool = std::env::var("S3_FORCE_PATH_STYLE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("S3_FORCE_PATH_STYLE must be true or false");

        Self {
            bucket,
            region,
            endpoint: non_empty_var("S3_ENDPOINT"),
            public_base_url: non_empty_var("S3_PUBLIC_BASE_URL"),
            key_prefix,
            access_key_id: non_empty_var("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("S3_SECRET_ACCESS_KEY"),
            force_path_style,
        }
    }

    /// Base URL object keys are appended to when building locations.
    ///
    /// Mirrors the `Location` S3 reports for an upload: virtual-hosted
    /// style on AWS, `endpoint/bucket` for path-style custom endpoints.
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.public_base_url {
            return url.trim_end_matches('/').to_string();
        }
        match &self.endpoint {
            Some(endpoint) if self.force_path_style => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
            }
            Some(endpoint) => match endpoint.split_once("://") {
                Some((scheme, host)) => {
                    format!("{scheme}://{}.{}", self.bucket, host.trim_end_matches('/'))
                }
                None => format!("https://{}.{}", self.bucket, endpoint.trim_end_matches('/')),
            },
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
