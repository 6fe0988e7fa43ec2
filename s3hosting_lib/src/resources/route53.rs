use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordType {
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasTarget {
    #[serde(rename = "DNSName")]
    pub dns_name: Value,
    #[serde(rename = "HostedZoneId")]
    pub hosted_zone_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnRecordSet {
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: RecordType,
    pub hosted_zone_name: String,
    pub alias_target: AliasTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CfnResource for CfnRecordSet {
    fn type_string(&self) -> &'static str {
        "AWS::Route53::RecordSet"
    }

    fn properties(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.is_empty() {
            return Err("Route53 record must have a name. Example mysubdomain.mywebsite.com".into());
        }
        if self.hosted_zone_name.is_empty() {
            return Err("Route53 record must name the hosted zone it belongs to".into());
        }
        Ok(())
    }
}

/// A hosted zone that already exists and is found by its domain name.
/// It is not created by the stack; the alias record is placed inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedZoneLookup {
    pub logical_id: String,
    pub domain_name: String,
}

impl HostedZoneLookup {
    pub fn new(logical_id: &str, domain_name: &str) -> Self {
        Self {
            logical_id: logical_id.into(),
            domain_name: domain_name.into(),
        }
    }

    /// hosted zone name must end in '.'
    pub fn zone_name(&self) -> String {
        let mut name = self.domain_name.clone();
        if !name.ends_with('.') {
            name.push('.');
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_name_is_fully_qualified() {
        assert_eq!(HostedZoneLookup::new("Z", "example.com").zone_name(), "example.com.");
        assert_eq!(HostedZoneLookup::new("Z", "example.com.").zone_name(), "example.com.");
    }

    #[test]
    fn serializes_alias_record() {
        let record = CfnRecordSet {
            name: "blog.example.com".into(),
            record_type: RecordType::A,
            hosted_zone_name: "example.com.".into(),
            alias_target: AliasTarget {
                dns_name: get_att("Dist", "DomainName"),
                hosted_zone_id: CLOUDFRONT_HOSTED_ZONE_ID.into(),
            },
            comment: None,
        };
        let props = record.properties().unwrap();
        assert_eq!(props["Type"], "A");
        assert_eq!(props["HostedZoneName"], "example.com.");
        assert_eq!(props["AliasTarget"]["HostedZoneId"], "Z2FDTNDATAQYW2");
        assert_eq!(props["AliasTarget"]["DNSName"]["Fn::GetAtt"][0], "Dist");
        assert!(props.get("Comment").is_none());
    }
}
