use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessControl {
    Private,
    PublicRead,
}

impl Default for AccessControl {
    fn default() -> Self {
        AccessControl::Private
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VersioningStatus {
    Enabled,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersioningConfiguration {
    pub status: VersioningStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebsiteConfiguration {
    pub index_document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_document: Option<String>,
}

impl Default for WebsiteConfiguration {
    fn default() -> Self {
        Self {
            index_document: "index.html".into(),
            error_document: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnBucket {
    pub bucket_name: String,
    pub access_control: AccessControl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning_configuration: Option<VersioningConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_configuration: Option<WebsiteConfiguration>,
}

impl CfnBucket {
    /// host part of the bucket's website endpoint, usable as a custom origin domain.
    /// `WebsiteURL` looks like `http://<bucket>.s3-website-<region>.amazonaws.com`,
    /// so splitting on '/' puts the host at index 2.
    pub fn website_domain_name(logical_id: &str) -> Value {
        select(2, split("/", get_att(logical_id, "WebsiteURL")))
    }

    pub fn arn(logical_id: &str) -> Value {
        get_att(logical_id, "Arn")
    }

    /// `<bucket arn>/*`, every object in the bucket.
    pub fn objects_arn(logical_id: &str) -> Value {
        join("", vec![Self::arn(logical_id), Value::String("/*".into())])
    }
}

impl CfnResource for CfnBucket {
    fn type_string(&self) -> &'static str {
        "AWS::S3::Bucket"
    }

    fn properties(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.bucket_name.is_empty() {
            return Err("Must provide a bucket name".into());
        }
        if let Some(website) = &self.website_configuration {
            if website.index_document.is_empty() {
                return Err("Website configuration must have an index document".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_origin_bucket_shape() {
        let bucket = CfnBucket {
            bucket_name: "site-origin-bucket".into(),
            access_control: AccessControl::Private,
            versioning_configuration: Some(VersioningConfiguration { status: VersioningStatus::Enabled }),
            website_configuration: Some(WebsiteConfiguration::default()),
        };
        let props = bucket.properties().unwrap();
        assert_eq!(props["BucketName"], "site-origin-bucket");
        assert_eq!(props["AccessControl"], "Private");
        assert_eq!(props["VersioningConfiguration"]["Status"], "Enabled");
        assert_eq!(props["WebsiteConfiguration"]["IndexDocument"], "index.html");
        assert!(props["WebsiteConfiguration"].get("ErrorDocument").is_none());
    }

    #[test]
    fn requires_a_name() {
        let bucket = CfnBucket::default();
        assert_eq!(bucket.validate().unwrap_err(), "Must provide a bucket name");
    }

    #[test]
    fn objects_arn_appends_wildcard() {
        let v = CfnBucket::objects_arn("B");
        assert_eq!(v["Fn::Join"][0], "");
        assert_eq!(v["Fn::Join"][1][0]["Fn::GetAtt"][0], "B");
        assert_eq!(v["Fn::Join"][1][1], "/*");
    }
}
