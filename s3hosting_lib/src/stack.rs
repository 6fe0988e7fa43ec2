use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::resources::*;
use crate::secret::OriginSecret;
use crate::template::{validate_stack_name, DeletionPolicy, Resource, Template};
use crate::{Error, Result};

pub mod logical_ids {
    pub const BUCKET: &str = "OriginBucket";
    pub const BUCKET_POLICY: &str = "OriginBucketPolicy";
    pub const DISTRIBUTION: &str = "Distribution";
    pub const RECORD: &str = "AliasRecord";
    pub const HOSTED_ZONE: &str = "HostedZone";
}

pub const ORIGIN_ID: &str = "origin1";
pub const SECRET_HEADER: &str = "Referer";
pub const SECRET_CONDITION_KEY: &str = "aws:Referer";
pub const NOT_FOUND_PAGE: &str = "/404.html";
pub const INDEX_DOCUMENT: &str = "index.html";

/// Account and region a stack is deployed to. Either may be unknown,
/// in which case the template is environment agnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Environment {
    /// fields set in `overrides` win, the rest fall back to `self`.
    pub fn merged_with(&self, overrides: Option<&Environment>) -> Environment {
        match overrides {
            None => self.clone(),
            Some(o) => Environment {
                account: o.account.clone().or_else(|| self.account.clone()),
                region: o.region.clone().or_else(|| self.region.clone()),
            },
        }
    }
}

/// per-environment properties, as stored in the invocation context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingProps {
    pub domain_name: String,
    pub hosted_zone_name: String,
    pub acm_certificate_arn: String,
    /// overrides the default account/region, field by field.
    #[serde(default)]
    pub env: Option<Environment>,
    /// if not set, the stack name is derived from the environment name.
    #[serde(default)]
    pub stack_name: Option<String>,
    /// if not set, the origin secret is derived from the stack id.
    #[serde(default)]
    pub origin_secret: Option<String>,
}

impl HostingProps {
    /// presence checks only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut out = vec![];
        if self.domain_name.is_empty() {
            out.push("domainName");
        }
        if self.hosted_zone_name.is_empty() {
            out.push("hostedZoneName");
        }
        if self.acm_certificate_arn.is_empty() {
            out.push("acmCertificateArn");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackIdentity {
    pub name: String,
    pub environment: Environment,
}

impl StackIdentity {
    pub fn new(name: &str, environment: Environment) -> Result<Self> {
        Ok(Self {
            name: validate_stack_name(name)?,
            environment,
        })
    }

    /// stable identifier of the stack, known before it is deployed.
    pub fn stack_id(&self) -> String {
        let region = self.environment.region.as_deref().unwrap_or("unknown-region");
        let account = self.environment.account.as_deref().unwrap_or("unknown-account");
        format!("arn:aws:cloudformation:{region}:{account}:stack/{}", self.name)
    }
}

/// S3 bucket website behind a CloudFront distribution, with a Route53
/// alias record pointing the domain at the distribution.
#[derive(Debug, Clone)]
pub struct S3HostingStack {
    identity: StackIdentity,
    props: HostingProps,
    secret: OriginSecret,
    bucket: CfnBucket,
    bucket_policy: CfnBucketPolicy,
    distribution: CfnDistribution,
    record: CfnRecordSet,
    hosted_zone: HostedZoneLookup,
}

impl S3HostingStack {
    pub fn new(identity: StackIdentity, props: HostingProps) -> Result<Self> {
        let missing = props.missing_fields();
        if !missing.is_empty() {
            return Err(Error::IncompleteProps {
                stack: identity.name.clone(),
                message: format!("missing required fields: {}", missing.join(", ")),
            });
        }
        let secret = match &props.origin_secret {
            Some(s) if !s.is_empty() => OriginSecret::provided(s),
            _ => OriginSecret::derive(&identity.stack_id()),
        };
        if secret.is_derived() {
            warn!(
                stack = %identity.name,
                "origin access is gated only by an md5 of the stack id sent as the Referer header. \
                 This is guessable and not authentication; set originSecret to a random value"
            );
        }

        let bucket = origin_bucket(&identity.name);
        let bucket_policy = origin_bucket_policy(logical_ids::BUCKET, &secret);
        let distribution = website_distribution(logical_ids::BUCKET, &props, &secret);
        let hosted_zone = HostedZoneLookup::new(logical_ids::HOSTED_ZONE, &props.hosted_zone_name);
        let record = alias_record(logical_ids::DISTRIBUTION, &props.domain_name, &hosted_zone);
        debug!(
            stack = %identity.name,
            domain = %props.domain_name,
            zone = %hosted_zone.zone_name(),
            "declared hosting stack"
        );

        Ok(Self {
            identity,
            props,
            secret,
            bucket,
            bucket_policy,
            distribution,
            record,
            hosted_zone,
        })
    }

    pub fn identity(&self) -> &StackIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn props(&self) -> &HostingProps {
        &self.props
    }

    pub fn secret(&self) -> &OriginSecret {
        &self.secret
    }

    pub fn bucket(&self) -> &CfnBucket {
        &self.bucket
    }

    pub fn bucket_policy(&self) -> &CfnBucketPolicy {
        &self.bucket_policy
    }

    pub fn distribution(&self) -> &CfnDistribution {
        &self.distribution
    }

    pub fn record(&self) -> &CfnRecordSet {
        &self.record
    }

    pub fn hosted_zone(&self) -> &HostedZoneLookup {
        &self.hosted_zone
    }

    /// the resources this stack creates, in declaration order.
    pub fn declarations(&self) -> Vec<Resource<'_>> {
        vec![
            Resource {
                logical_id: logical_ids::BUCKET,
                properties: &self.bucket,
                deletion_policy: Some(DeletionPolicy::Retain),
            },
            Resource {
                logical_id: logical_ids::BUCKET_POLICY,
                properties: &self.bucket_policy,
                deletion_policy: None,
            },
            Resource {
                logical_id: logical_ids::DISTRIBUTION,
                properties: &self.distribution,
                deletion_policy: None,
            },
            Resource {
                logical_id: logical_ids::RECORD,
                properties: &self.record,
                deletion_policy: None,
            },
        ]
    }

    /// logical ids `logical_id` depends on: every resource it references,
    /// plus the looked up hosted zone for the alias record.
    pub fn dependencies_of(&self, logical_id: &str) -> Result<Vec<String>> {
        let declarations = self.declarations();
        let resource = match declarations.iter().find(|r| r.logical_id == logical_id) {
            Some(r) => r,
            None => return Ok(vec![]),
        };
        let properties = resource.properties.properties()?;
        let mut out: Vec<String> = referenced_ids(&properties)
            .into_iter()
            .filter(|id| id != logical_id && declarations.iter().any(|r| r.logical_id == id))
            .collect();
        if logical_id == logical_ids::RECORD {
            out.push(self.hosted_zone.logical_id.clone());
        }
        Ok(out)
    }

    /// value of the secret header as declared on the distribution's origin.
    pub fn origin_header_secret(&self) -> Option<&str> {
        self.distribution.default_origin()?.header(SECRET_HEADER)
    }

    /// value of the secret as declared in the bucket policy condition.
    pub fn policy_condition_secret(&self) -> Option<&str> {
        self.bucket_policy
            .policy_document
            .statement
            .first()?
            .condition_value("StringEquals", SECRET_CONDITION_KEY)
    }

    pub fn to_template(&self) -> Result<Template> {
        let mut template = Template::from_resources(&self.declarations())?;
        template.description = Some(format!(
            "Static website hosting for {} ({})",
            self.props.domain_name, self.identity.name
        ));
        template.add_output("BucketName", "Name of the origin bucket", get_ref(logical_ids::BUCKET));
        template.add_output(
            "BucketWebsiteURL",
            "Website endpoint of the origin bucket",
            get_att(logical_ids::BUCKET, "WebsiteURL"),
        );
        template.add_output("DistributionId", "Id of the CloudFront distribution", get_ref(logical_ids::DISTRIBUTION));
        template.add_output(
            "DistributionDomainName",
            "Domain name of the CloudFront distribution",
            CfnDistribution::domain_name(logical_ids::DISTRIBUTION),
        );
        Ok(template)
    }
}

fn origin_bucket(stack_name: &str) -> CfnBucket {
    CfnBucket {
        bucket_name: format!("{stack_name}-origin-bucket"),
        access_control: AccessControl::Private,
        versioning_configuration: Some(VersioningConfiguration {
            status: VersioningStatus::Enabled,
        }),
        website_configuration: Some(WebsiteConfiguration {
            index_document: INDEX_DOCUMENT.into(),
            error_document: None,
        }),
    }
}

fn origin_bucket_policy(bucket_id: &str, secret: &OriginSecret) -> CfnBucketPolicy {
    let statement = PolicyStatement {
        effect: Effect::Allow,
        principal: PolicyStatement::anyone(),
        action: vec!["s3:GetObject".into()],
        resource: vec![CfnBucket::objects_arn(bucket_id)],
        condition: None,
    }
    .with_condition("StringEquals", SECRET_CONDITION_KEY, secret.value());
    CfnBucketPolicy {
        bucket: get_ref(bucket_id),
        policy_document: PolicyDocument {
            statement: vec![statement],
            ..Default::default()
        },
    }
}

fn website_distribution(bucket_id: &str, props: &HostingProps, secret: &OriginSecret) -> CfnDistribution {
    let origin = Origin {
        id: ORIGIN_ID.into(),
        domain_name: CfnBucket::website_domain_name(bucket_id),
        custom_origin_config: CustomOriginConfig {
            origin_protocol_policy: OriginProtocolPolicy::HttpOnly,
            ..Default::default()
        },
        origin_custom_headers: vec![OriginCustomHeader {
            header_name: SECRET_HEADER.into(),
            header_value: secret.value().into(),
        }],
    };
    CfnDistribution {
        distribution_config: DistributionConfig {
            aliases: vec![props.domain_name.clone()],
            comment: None,
            custom_error_responses: vec![CustomErrorResponse {
                error_code: 404,
                response_code: Some(200),
                response_page_path: Some(NOT_FOUND_PAGE.into()),
            }],
            default_cache_behavior: DefaultCacheBehavior::for_origin(ORIGIN_ID),
            default_root_object: Some(INDEX_DOCUMENT.into()),
            enabled: true,
            http_version: HttpVersion::Http2,
            ipv6_enabled: true,
            origins: vec![origin],
            price_class: PriceClass::PriceClass100,
            viewer_certificate: Some(ViewerCertificate::sni(&props.acm_certificate_arn)),
        },
    }
}

fn alias_record(distribution_id: &str, domain_name: &str, zone: &HostedZoneLookup) -> CfnRecordSet {
    CfnRecordSet {
        name: domain_name.into(),
        record_type: RecordType::A,
        hosted_zone_name: zone.zone_name(),
        alias_target: AliasTarget {
            dns_name: CfnDistribution::domain_name(distribution_id),
            hosted_zone_id: CLOUDFRONT_HOSTED_ZONE_ID.into(),
        },
        comment: None,
    }
}
