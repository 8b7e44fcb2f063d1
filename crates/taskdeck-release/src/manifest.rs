// SPDX-License-Identifier: Apache-2.0

use crate::tag::Tag;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const APP_LABEL: &str = "app";
pub const CONTAINER_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError(pub String);

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RenderError {}

/// Everything the Deployment + Service pair is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSpec {
    /// Image repository without a tag, e.g. `registry.local/taskdeck`.
    pub image: String,
    pub tag: Tag,
    pub replicas: u32,
    /// Names the Deployment, the Service, and the selector label value.
    pub app_name: String,
}

impl ManifestSpec {
    #[must_use]
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedManifest {
    pub yaml: String,
    /// Hex sha256 of the rendered bytes, recorded in pipeline reports.
    pub sha256: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Metadata {
    name: String,
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Deployment {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    metadata: Metadata,
    spec: DeploymentSpec,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeploymentSpec {
    replicas: u32,
    selector: Selector,
    template: PodTemplate,
}

#[derive(Debug, Serialize, Deserialize)]
struct Selector {
    #[serde(rename = "matchLabels")]
    match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PodTemplate {
    metadata: Metadata,
    spec: PodSpec,
}

#[derive(Debug, Serialize, Deserialize)]
struct PodSpec {
    containers: Vec<Container>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Container {
    name: String,
    image: String,
    ports: Vec<ContainerPort>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContainerPort {
    #[serde(rename = "containerPort")]
    container_port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
struct Service {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    metadata: Metadata,
    spec: ServiceSpec,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServiceSpec {
    #[serde(rename = "type")]
    service_type: String,
    selector: BTreeMap<String, String>,
    ports: Vec<ServicePort>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServicePort {
    port: u16,
    #[serde(rename = "targetPort")]
    target_port: u16,
}

/// Pure rendering: same spec, same bytes, same digest.
pub fn render_manifest(spec: &ManifestSpec) -> Result<RenderedManifest, RenderError> {
    let labels: BTreeMap<String, String> =
        BTreeMap::from([(APP_LABEL.to_string(), spec.app_name.clone())]);

    let deployment = Deployment {
        api_version: "apps/v1".to_string(),
        kind: "Deployment".to_string(),
        metadata: Metadata {
            name: spec.app_name.clone(),
            labels: labels.clone(),
        },
        spec: DeploymentSpec {
            replicas: spec.replicas,
            selector: Selector {
                match_labels: labels.clone(),
            },
            template: PodTemplate {
                metadata: Metadata {
                    name: spec.app_name.clone(),
                    labels: labels.clone(),
                },
                spec: PodSpec {
                    containers: vec![Container {
                        name: spec.app_name.clone(),
                        image: spec.image_ref(),
                        ports: vec![ContainerPort {
                            container_port: CONTAINER_PORT,
                        }],
                    }],
                },
            },
        },
    };

    let service = Service {
        api_version: "v1".to_string(),
        kind: "Service".to_string(),
        metadata: Metadata {
            name: spec.app_name.clone(),
            labels: labels.clone(),
        },
        spec: ServiceSpec {
            service_type: "NodePort".to_string(),
            selector: labels,
            ports: vec![ServicePort {
                port: CONTAINER_PORT,
                target_port: CONTAINER_PORT,
            }],
        },
    };

    let deployment_yaml =
        serde_yaml::to_string(&deployment).map_err(|e| RenderError(e.to_string()))?;
    let service_yaml = serde_yaml::to_string(&service).map_err(|e| RenderError(e.to_string()))?;
    let yaml = format!("{deployment_yaml}---\n{service_yaml}");

    let mut hasher = Sha256::new();
    hasher.update(yaml.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    Ok(RenderedManifest { yaml, sha256 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ManifestSpec {
        ManifestSpec {
            image: "registry.local/taskdeck".to_string(),
            tag: Tag::new(1, 4),
            replicas: 2,
            app_name: "taskdeck".to_string(),
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render_manifest(&spec()).expect("render");
        let b = render_manifest(&spec()).expect("render");
        assert_eq!(a, b);
    }

    #[test]
    fn rendered_yaml_carries_image_ref_and_port() {
        let rendered = render_manifest(&spec()).expect("render");
        assert!(rendered.yaml.contains("registry.local/taskdeck:v1.4"));
        assert!(rendered.yaml.contains("containerPort: 8000"));
        assert!(rendered.yaml.contains("replicas: 2"));
        assert!(rendered.yaml.contains("---\n"));
    }

    #[test]
    fn both_documents_parse_back() {
        let rendered = render_manifest(&spec()).expect("render");
        let docs: Vec<&str> = rendered.yaml.split("---\n").collect();
        assert_eq!(docs.len(), 2);
        let deployment: Deployment = serde_yaml::from_str(docs[0]).expect("deployment");
        assert_eq!(deployment.kind, "Deployment");
        assert_eq!(deployment.spec.template.spec.containers.len(), 1);
        let service: Service = serde_yaml::from_str(docs[1]).expect("service");
        assert_eq!(service.kind, "Service");
        assert_eq!(service.spec.ports[0].port, 8000);
    }
}
