use super::*;

/// hosted zone id used by every CloudFront distribution when it is the
/// target of a Route53 alias record.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OriginProtocolPolicy {
    #[serde(rename = "http-only")]
    HttpOnly,
    #[serde(rename = "match-viewer")]
    MatchViewer,
    #[serde(rename = "https-only")]
    HttpsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewerProtocolPolicy {
    #[serde(rename = "allow-all")]
    AllowAll,
    #[serde(rename = "redirect-to-https")]
    RedirectToHttps,
    #[serde(rename = "https-only")]
    HttpsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceClass {
    #[serde(rename = "PriceClass_100")]
    PriceClass100,
    #[serde(rename = "PriceClass_200")]
    PriceClass200,
    #[serde(rename = "PriceClass_All")]
    PriceClassAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SslSupportMethod {
    #[serde(rename = "sni-only")]
    SniOnly,
    #[serde(rename = "vip")]
    Vip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpVersion {
    #[serde(rename = "http1.1")]
    Http1_1,
    #[serde(rename = "http2")]
    Http2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OriginCustomHeader {
    pub header_name: String,
    pub header_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomOriginConfig {
    #[serde(rename = "HTTPPort")]
    pub http_port: u16,
    #[serde(rename = "HTTPSPort")]
    pub https_port: u16,
    #[serde(rename = "OriginProtocolPolicy")]
    pub origin_protocol_policy: OriginProtocolPolicy,
    #[serde(rename = "OriginSSLProtocols")]
    pub origin_ssl_protocols: Vec<String>,
}

impl Default for CustomOriginConfig {
    fn default() -> Self {
        Self {
            http_port: 80,
            https_port: 443,
            origin_protocol_policy: OriginProtocolPolicy::HttpOnly,
            origin_ssl_protocols: vec!["TLSv1.2".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Origin {
    pub id: String,
    pub domain_name: Value,
    pub custom_origin_config: CustomOriginConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub origin_custom_headers: Vec<OriginCustomHeader>,
}

impl Origin {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.origin_custom_headers
            .iter()
            .find(|h| h.header_name.eq_ignore_ascii_case(name))
            .map(|h| h.header_value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cookies {
    pub forward: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForwardedValues {
    pub query_string: bool,
    pub cookies: Cookies,
}

impl Default for ForwardedValues {
    fn default() -> Self {
        Self {
            query_string: false,
            cookies: Cookies { forward: "none".into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefaultCacheBehavior {
    pub target_origin_id: String,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    pub allowed_methods: Vec<String>,
    pub cached_methods: Vec<String>,
    pub compress: bool,
    pub forwarded_values: ForwardedValues,
}

impl DefaultCacheBehavior {
    pub fn for_origin(origin_id: &str) -> Self {
        Self {
            target_origin_id: origin_id.into(),
            viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
            allowed_methods: vec!["GET".into(), "HEAD".into()],
            cached_methods: vec!["GET".into(), "HEAD".into()],
            compress: true,
            forwarded_values: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomErrorResponse {
    pub error_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_page_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewerCertificate {
    pub acm_certificate_arn: String,
    pub ssl_support_method: SslSupportMethod,
    pub minimum_protocol_version: String,
}

impl ViewerCertificate {
    pub fn sni(acm_certificate_arn: &str) -> Self {
        Self {
            acm_certificate_arn: acm_certificate_arn.into(),
            ssl_support_method: SslSupportMethod::SniOnly,
            minimum_protocol_version: "TLSv1.2_2021".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_error_responses: Vec<CustomErrorResponse>,
    pub default_cache_behavior: DefaultCacheBehavior,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_root_object: Option<String>,
    pub enabled: bool,
    pub http_version: HttpVersion,
    #[serde(rename = "IPV6Enabled")]
    pub ipv6_enabled: bool,
    pub origins: Vec<Origin>,
    pub price_class: PriceClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_certificate: Option<ViewerCertificate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnDistribution {
    pub distribution_config: DistributionConfig,
}

impl CfnDistribution {
    pub fn domain_name(logical_id: &str) -> Value {
        get_att(logical_id, "DomainName")
    }

    pub fn default_origin(&self) -> Option<&Origin> {
        let target = &self.distribution_config.default_cache_behavior.target_origin_id;
        self.distribution_config.origins.iter().find(|o| &o.id == target)
    }

    pub fn error_response(&self, error_code: u16) -> Option<&CustomErrorResponse> {
        self.distribution_config
            .custom_error_responses
            .iter()
            .find(|r| r.error_code == error_code)
    }
}

impl CfnResource for CfnDistribution {
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::Distribution"
    }

    fn properties(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let config = &self.distribution_config;
        if config.origins.is_empty() {
            return Err("Must provide at least one origin to cloudfront distribution".into());
        }
        if self.default_origin().is_none() {
            return Err(format!(
                "Default cache behavior targets origin '{}' which does not exist",
                config.default_cache_behavior.target_origin_id
            ));
        }
        if !config.aliases.is_empty() && config.viewer_certificate.is_none() {
            return Err("Distribution aliases require a viewer certificate".into());
        }
        if let Some(cert) = &config.viewer_certificate {
            if cert.acm_certificate_arn.is_empty() {
                return Err("Viewer certificate must have an ACM certificate ARN".into());
            }
        }
        Ok(())
    }
}
