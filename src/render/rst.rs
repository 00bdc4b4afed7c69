//! Endpoint documentation renderer
//!
//! Emits one RST document for the whole catalog, compatible with
//! `sphinxcontrib.httpdomain`: a section per resource, a block per
//! endpoint/method pair, and a sink-ordered field roster per block.
//! A method whose schema yields no documentable fields is skipped.

use std::cmp::Reverse;

use tracing::debug;

use crate::catalog::{ResourceCatalog, ResourceDef};
use crate::config::DocConfig;
use crate::error::Result;
use crate::fields::{AccessMode, FieldDescriptor, FlattenContext, Flattener};
use crate::render::{value_label, value_list_label};
use crate::schema::FieldAttributes;

const SPACE: &str = "   ";

/// Renders httpdomain RST for a resource catalog
pub struct RstRenderer<'a> {
    catalog: &'a ResourceCatalog,
    config: &'a DocConfig,
}

impl<'a> RstRenderer<'a> {
    pub fn new(catalog: &'a ResourceCatalog, config: &'a DocConfig) -> Self {
        RstRenderer { catalog, config }
    }

    /// Render the full document
    pub fn render(&self) -> Result<String> {
        let mut doc = String::from("API\n===\n");
        for def in self.catalog.iter() {
            doc.push_str(&self.document_resource(def)?);
        }
        Ok(doc)
    }

    /// Document one resource; empty when no endpoint has anything to show
    fn document_resource(&self, def: &ResourceDef) -> Result<String> {
        debug!(resource = %def.name, "documenting resource");
        let mut doc = format!("{}\n--------------------\n", def.type_name);
        let mut one_successful = false;

        for method in &def.resource_methods {
            if let Some(block) = self.document_endpoint(def, method, true)? {
                doc.push_str(&block);
                one_successful = true;
            }
        }
        for method in &def.item_methods {
            if let Some(block) = self.document_endpoint(def, method, false)? {
                doc.push_str(&block);
                one_successful = true;
            }
        }

        if self.config.api.login_resource.as_deref() == Some(def.name.as_str()) {
            doc.push_str(&self.document_login_endpoint());
            one_successful = true;
        }

        if one_successful {
            Ok(doc)
        } else {
            Ok(String::new())
        }
    }

    /// Document one endpoint/method pair
    ///
    /// `resource` selects the collection endpoint over the item endpoint.
    /// `None` means the schema yields no documentable field for this method.
    fn document_endpoint(&self, def: &ResourceDef, method: &str, resource: bool) -> Result<Option<String>> {
        let item_url = if resource {
            String::new()
        } else {
            format!("/({}:{})", def.item_url, self.config.api.id_field)
        };
        let mut doc = vec![
            format!(
                ".. http:{}:: {}{}{}\n\n",
                method.to_lowercase(),
                self.database_prefix(),
                def.url,
                item_url
            ),
            String::new(),
        ];

        if !resource {
            if let Some(lookup) = &def.additional_lookup {
                doc.push(format!(
                    "{} Additional Lookup: {}{}/*({}:{})*",
                    SPACE,
                    self.database_prefix(),
                    def.url,
                    lookup.url,
                    lookup.field
                ));
                doc.push(String::new());
            }
        }

        doc.extend(
            [
                ":reqheader Accept: \"application/json\"",
                ":resheader Content-Type: \"application/json\"",
                ":resheader Date: The server date",
                ":resheader Content-Length:",
                ":resheader Server:",
                ":statuscode 400:",
                ":statuscode 422: Document fails validation.",
                ":statuscode 403:",
                ":statuscode 404:",
                ":statuscode 405:",
                ":statuscode 406:",
                ":statuscode 415:",
                ":statuscode 500: Any non-documented error. Please, report if you get this code.",
            ]
            .iter()
            .map(|line| format!("{}{}", SPACE, line)),
        );

        doc.push(format!(
            "{}:reqheader Authorization: \"Basic\" + space + token from *POST /login*",
            SPACE
        ));
        let status = match method {
            "POST" => ":statuscode 201:",
            "DELETE" => ":statuscode 204:",
            _ => ":statuscode 200:",
        };
        doc.push(format!("{}{}", SPACE, status));

        if resource {
            doc.push(format!("{}:resheader Cache-Control: max-age=1, must-revalidate", SPACE));
        } else {
            doc.push(format!(
                "{}:resheader Cache-Control: max-age={}, must-revalidate",
                SPACE, self.config.api.item_cache
            ));
            doc.push(format!(
                "{}:resheader Last-Modified: The date when the resource was modified",
                SPACE
            ));
            doc.push(format!(
                "{}:resheader Link: The link at the context, as in http://www.w3.org/ns/json-ld#context",
                SPACE
            ));
        }

        match self.resource_schema(def, method, resource)? {
            Some(block) => doc.push(block),
            None => return Ok(None),
        }

        Ok(Some(doc.join("\n") + "\n\n"))
    }

    /// Build the sink-ordered field roster for one endpoint
    ///
    /// `None` signals an empty schema under this method's access mode; the
    /// caller skips the whole block.
    fn resource_schema(&self, def: &ResourceDef, method: &str, resource: bool) -> Result<Option<String>> {
        let mode = AccessMode::from_method(method);
        let flattener = Flattener::new(self.catalog);
        let json_type = if resource && mode.is_read() { "jsonarr" } else { "json" };
        let mut lines: Vec<(String, i64)> = Vec::new();

        if method != "DELETE" && method != "PATCH" {
            let chevron = if method == "POST" { '<' } else { '>' };
            let ctx = FlattenContext::new(&def.type_name, mode).with_projection(&def.projection);
            let descriptors = flattener.flatten(&def.fields, &ctx)?;
            if descriptors.is_empty() {
                return Ok(None);
            }
            for descriptor in &descriptors {
                lines.push(format_field(descriptor, chevron, json_type));
            }

            // Identifier and timestamp fields the storage layer adds
            let prefix = format!("{}:>{} ", SPACE, json_type);
            if !def.declares_field(&self.config.api.id_field) {
                lines.push((format!("{}string {}:", prefix, self.config.api.id_field), 10));
            }
            lines.push((format!("{}datetime {}:", prefix, self.config.api.last_updated), -10));
            lines.push((format!("{}datetime {}:", prefix, self.config.api.date_created), -10));
        }

        if mode.is_read() && resource {
            for (field_type, name, description) in [
                ("list", "_items", "Contains the actual data, *Response JSON Array of Objects*."),
                ("dict", "_meta", "Provides pagination data."),
                ("natural", "_meta.max_results", "Maximum number of elements in `_items`."),
                ("natural", "_meta.total", "Total of elements."),
                ("natural", "_meta.page", "Actual page number."),
                (
                    "dict",
                    "_links",
                    "Provides `HATEOAS` directives. In concrete a link to *itself* and to the *parent*. See http://python-eve.org/features.html#hateoas.",
                ),
            ] {
                lines.push((format!("{}:>json {} {}: {}", SPACE, field_type, name, description), -10));
            }
        } else if method != "DELETE" {
            lines.push((
                format!(
                    "{}:>json dict _links: Provides `HATEOAS` directives. In concrete a link to *itself*, the *parent* endpoint and the *collection* endpoint. See http://python-eve.org/features.html#hateoas.",
                    SPACE
                ),
                -10,
            ));
        }

        // Computed fields echoed back in write responses
        if (method == "POST" || method == "PATCH") && !def.extra_response_fields.is_empty() {
            let ctx = FlattenContext::new(&def.type_name, mode).with_projection(&def.projection);
            for field_name in &def.extra_response_fields {
                if let Some((_, node)) = def.fields.iter().find(|(n, _)| n == field_name) {
                    for descriptor in flattener.resolve_field(field_name, node, &ctx)? {
                        lines.push(format_field(&descriptor, '>', json_type));
                    }
                }
            }
        }

        lines.sort_by_key(|(_, sink)| Reverse(*sink));

        let mut block: Vec<String> = lines.into_iter().map(|(line, _)| line).collect();
        block.push(format!(
            "{}:<json object {}: See \"Meta\" for more information.",
            SPACE, self.config.api.meta_field
        ));
        Ok(Some(block.join("\n")))
    }

    /// Fixed login block, emitted for the configured account resource
    fn document_login_endpoint(&self) -> String {
        let mut doc = vec![
            format!(".. http:post:: {}login\n\n", self.database_prefix()),
            String::new(),
        ];
        doc.extend(
            [
                ":reqheader Accept: \"application/json\"",
                ":resheader Content-Type: \"application/json\"",
                ":resheader Date: The server date",
                ":resheader Content-Length:",
                ":resheader Server:",
                ":statuscode 400:",
                ":statuscode 422: Document fails validation.",
                ":statuscode 403:",
                ":statuscode 404:",
                ":statuscode 405:",
                ":statuscode 406:",
                ":statuscode 415:",
                ":statuscode 500: Any non-documented error. Please, report if you get this code.",
                ":<json string email: The email of the account.",
                ":<json string password: The password of the account.",
                ":>json string token: The token of the user to use in `Authorization` header.",
                ":>json string password: The password of the user.",
                ":>json string role:",
                ":>json string email:",
                ":>json string _id:",
                ":>json list databases:",
                ":>json string defaultDatabase:",
            ]
            .iter()
            .map(|line| format!("{}{}", SPACE, line)),
        );
        doc.join("\n") + "\n\n"
    }

    fn database_prefix(&self) -> &'static str {
        if self.config.api.database_prefix {
            "(string:database)/"
        } else {
            ""
        }
    }
}

/// Format one descriptor as an httpdomain field line paired with its sink
fn format_field(descriptor: &FieldDescriptor, chevron: char, json_type: &str) -> (String, i64) {
    let required = if descriptor.attributes.is_required() { "*" } else { "" };
    let field_type = match &descriptor.reference {
        Some(reference) => format!("{}->{}", descriptor.field_type, reference),
        None => descriptor.field_type.to_string(),
    };
    let attrs = attr_labels(&descriptor.attributes).join(", ");
    let line = format!(
        "{}:{}{} {} {}{}: {}",
        SPACE, chevron, json_type, field_type, required, descriptor.name, attrs
    );
    (line, descriptor.attributes.sink)
}

/// Attribute labels shown after the field, in a fixed order, absent slots skipped
fn attr_labels(attrs: &FieldAttributes) -> Vec<String> {
    let mut labels = Vec::new();
    if let Some(unique) = attrs.unique {
        labels.push(format!("Unique: {}", unique));
    }
    if let Some(default) = &attrs.default {
        labels.push(format!("Default: {}", value_label(default)));
    }
    if let Some(allowed) = &attrs.allowed {
        labels.push(format!("Allowed: {}", value_list_label(allowed)));
    }
    if let Some(description) = &attrs.description {
        labels.push(format!("Description: {}", description));
    }
    if let Some(writeonly) = attrs.writeonly {
        labels.push(format!("Write only: {}", writeonly));
    }
    if let Some(readonly) = attrs.readonly {
        labels.push(format!("Read only: {}", readonly));
    }
    if let Some(modifiable) = attrs.modifiable {
        labels.push(format!("Modifiable: {}", modifiable));
    }
    if let Some(unit_code) = &attrs.unit_code {
        labels.push(format!("Unit Code: {}", unit_code));
    }
    if let Some(doc) = &attrs.doc {
        labels.push(format!("Doc: {}", doc));
    }
    if let Some(roles) = &attrs.write_roles {
        labels.push(format!("Roles with writing permission: {}", roles.join(", ")));
    }
    if let Some(or_groups) = &attrs.or_groups {
        labels.push(format!("OR: {}", or_groups.join(", ")));
    }
    if let Some(excludes) = &attrs.excludes {
        labels.push(format!("Excludes: {}", excludes.join(", ")));
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    fn descriptor(name: &str, required: Option<bool>, sink: i64) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            field_type: FieldType::Primitive("string".to_string()),
            reference: None,
            attributes: FieldAttributes {
                required,
                sink,
                ..FieldAttributes::default()
            },
        }
    }

    #[test]
    fn test_required_marker() {
        let (line, _) = format_field(&descriptor("label", Some(true), 0), '<', "json");
        assert!(line.contains(":<json string *label:"));

        let (line, _) = format_field(&descriptor("label", Some(false), 0), '<', "json");
        assert!(line.contains(":<json string label:"));
        assert!(!line.contains('*'));
    }

    #[test]
    fn test_reference_arrow() {
        let mut d = descriptor("owner", None, 0);
        d.field_type = FieldType::Primitive("objectid".to_string());
        d.reference = Some("User".to_string());
        let (line, _) = format_field(&d, '>', "json");
        assert!(line.contains(":>json objectid->User owner:"));
    }

    #[test]
    fn test_sink_carried() {
        let (_, sink) = format_field(&descriptor("label", None, 7), '<', "json");
        assert_eq!(sink, 7);
    }
}
