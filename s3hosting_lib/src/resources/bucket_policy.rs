use super::*;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: Effect,
    pub principal: Value,
    pub action: Vec<String>,
    pub resource: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl PolicyStatement {
    /// the `*` principal, any caller at all.
    pub fn anyone() -> Value {
        json!({ "AWS": "*" })
    }

    /// adds `{ operator: { key: value } }` to the statement's conditions.
    pub fn with_condition(mut self, operator: &str, key: &str, value: &str) -> Self {
        let mut conditions = match self.condition.take() {
            Some(Value::Object(m)) => m,
            _ => Map::new(),
        };
        let entry = conditions.entry(operator.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(op) = entry {
            op.insert(key.to_string(), Value::String(value.to_string()));
        }
        self.condition = Some(Value::Object(conditions));
        self
    }

    pub fn condition_value(&self, operator: &str, key: &str) -> Option<&str> {
        self.condition.as_ref()?.get(operator)?.get(key)?.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.into(),
            statement: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnBucketPolicy {
    /// `Ref` to the bucket the policy is attached to.
    pub bucket: Value,
    pub policy_document: PolicyDocument,
}

impl CfnResource for CfnBucketPolicy {
    fn type_string(&self) -> &'static str {
        "AWS::S3::BucketPolicy"
    }

    fn properties(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.policy_document.statement.is_empty() {
            return Err("Bucket policy must have at least one statement".into());
        }
        for statement in &self.policy_document.statement {
            if statement.action.is_empty() || statement.resource.is_empty() {
                return Err("Policy statements must name at least one action and one resource".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> PolicyStatement {
        PolicyStatement {
            effect: Effect::Allow,
            principal: PolicyStatement::anyone(),
            action: vec!["s3:GetObject".into()],
            resource: vec![json!("arn:aws:s3:::b/*")],
            condition: None,
        }
    }

    #[test]
    fn conditions_accumulate_under_operator() {
        let s = statement()
            .with_condition("StringEquals", "aws:Referer", "abc")
            .with_condition("StringEquals", "aws:SourceVpce", "vpce-1");
        assert_eq!(s.condition_value("StringEquals", "aws:Referer"), Some("abc"));
        assert_eq!(s.condition_value("StringEquals", "aws:SourceVpce"), Some("vpce-1"));
        assert_eq!(s.condition_value("StringLike", "aws:Referer"), None);
    }

    #[test]
    fn serializes_statement() {
        let policy = CfnBucketPolicy {
            bucket: get_ref("B"),
            policy_document: PolicyDocument {
                statement: vec![statement().with_condition("StringEquals", "aws:Referer", "abc")],
                ..Default::default()
            },
        };
        let props = policy.properties().unwrap();
        assert_eq!(props["Bucket"]["Ref"], "B");
        assert_eq!(props["PolicyDocument"]["Version"], "2012-10-17");
        let s = &props["PolicyDocument"]["Statement"][0];
        assert_eq!(s["Effect"], "Allow");
        assert_eq!(s["Principal"]["AWS"], "*");
        assert_eq!(s["Action"][0], "s3:GetObject");
        assert_eq!(s["Condition"]["StringEquals"]["aws:Referer"], "abc");
    }

    #[test]
    fn empty_policy_is_rejected() {
        let policy = CfnBucketPolicy { bucket: get_ref("B"), policy_document: Default::default() };
        assert!(policy.validate().is_err());
    }
}
