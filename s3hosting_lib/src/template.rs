use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A typed CloudFormation resource. `properties` is what ends up under the
/// `Properties` key of the resource in the template.
pub trait CfnResource {
    fn type_string(&self) -> &'static str;
    fn properties(&self) -> std::result::Result<Value, serde_json::Error>;
    /// local presence checks only. anything the provider validates
    /// (certificate validity, zone existence, etc.) is left to CloudFormation.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

/// a resource declaration as it sits in a stack before rendering.
pub struct Resource<'a> {
    pub logical_id: &'a str,
    pub properties: &'a dyn CfnResource,
    /// when set, applies to both deletion and replacement of the resource.
    pub deletion_policy: Option<DeletionPolicy>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
    #[serde(rename = "DeletionPolicy", default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
    #[serde(rename = "UpdateReplacePolicy", default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<DeletionPolicy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateOutput {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Value")]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub version: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, TemplateResource>,
    #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, TemplateOutput>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: Default::default(),
            outputs: Default::default(),
        }
    }
}

impl Template {
    /// validates every resource and renders it into a template.
    pub fn from_resources(resources: &[Resource<'_>]) -> Result<Template> {
        let mut out_template = Template::default();
        for resource in resources.iter() {
            if let Err(message) = resource.properties.validate() {
                return Err(Error::Validation {
                    resource: resource.logical_id.to_string(),
                    message,
                });
            }
            let saved_resource = TemplateResource {
                ty: resource.properties.type_string().to_string(),
                properties: resource.properties.properties()?,
                deletion_policy: resource.deletion_policy,
                update_replace_policy: resource.deletion_policy,
            };
            out_template.resources.insert(resource.logical_id.to_string(), saved_resource);
        }
        Ok(out_template)
    }

    pub fn add_output(&mut self, key: &str, description: &str, value: Value) {
        self.outputs.insert(key.to_string(), TemplateOutput {
            description: description.to_string(),
            value,
        });
    }

    pub fn resources_of_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = (&'a String, &'a TemplateResource)> + 'a {
        self.resources.iter().filter(move |(_, r)| r.ty == ty)
    }

    /// pretty, so the template reads well in the CloudFormation console.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub const MAX_STACK_NAME_LEN: usize = 128;

const STACK_NAME_RESTRICTION: &str = "Must only consist of alphanumeric characters and hyphens, Must start with an alphabetical character, and cannot be longer than 128 characters.";

/// A stack name can contain only alphanumeric characters (case sensitive) and hyphens.
/// It must start with an alphabetical character and can't be longer than 128 characters.
pub fn validate_stack_name(stack_name: &str) -> Result<String> {
    let invalid = || Error::InvalidStackName {
        name: stack_name.to_string(),
        restriction: STACK_NAME_RESTRICTION,
    };
    match stack_name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid()),
    }
    if stack_name.chars().any(|c| !c.is_ascii_alphanumeric() && c != '-') {
        return Err(invalid());
    }
    if stack_name.len() > MAX_STACK_NAME_LEN {
        return Err(invalid());
    }
    Ok(stack_name.to_string())
}
