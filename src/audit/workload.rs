//! Uniform read-only views over workload objects.
//!
//! Every supported kind implements [`Workload`], which knows how to reach
//! the pod spec it carries. [`Items`] adapts a fetched collection of one
//! kind into a sequence of [`Item`]s that checks can consume without caring
//! which kind they came from.

use crate::audit::types::KubeType;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, ReplicationController};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Zero-value spec handed out for objects that arrive without one.
static EMPTY_POD_SPEC: Lazy<PodSpec> = Lazy::new(PodSpec::default);

/// A workload kind that owns or wraps a pod specification.
pub trait Workload:
    kube::Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    const KUBE_TYPE: KubeType;

    /// The pod spec reachable from this object, if the object carries one.
    fn pod_spec(&self) -> Option<&PodSpec>;
}

impl Workload for Pod {
    const KUBE_TYPE: KubeType = KubeType::Pod;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()
    }
}

impl Workload for Deployment {
    const KUBE_TYPE: KubeType = KubeType::Deployment;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(|s| s.template.spec.as_ref())
    }
}

impl Workload for StatefulSet {
    const KUBE_TYPE: KubeType = KubeType::StatefulSet;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(|s| s.template.spec.as_ref())
    }
}

impl Workload for DaemonSet {
    const KUBE_TYPE: KubeType = KubeType::DaemonSet;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(|s| s.template.spec.as_ref())
    }
}

impl Workload for ReplicationController {
    const KUBE_TYPE: KubeType = KubeType::ReplicationController;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec
            .as_ref()
            .and_then(|s| s.template.as_ref())
            .and_then(|t| t.spec.as_ref())
    }
}

/// Identity of the object an item was adapted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity<'a> {
    pub kube_type: KubeType,
    pub namespace: &'a str,
    pub name: &'a str,
}

/// A read-only view over one workload object.
#[derive(Debug, Clone, Copy)]
pub struct Item<'a> {
    kube_type: KubeType,
    namespace: &'a str,
    name: &'a str,
    pod_spec: &'a PodSpec,
}

impl<'a> Item<'a> {
    pub fn new(kube_type: KubeType, namespace: &'a str, name: &'a str, pod_spec: &'a PodSpec) -> Self {
        Self {
            kube_type,
            namespace,
            name,
            pod_spec,
        }
    }

    /// Adapt a single workload object.
    ///
    /// Objects without a spec are adapted with an empty pod spec.
    pub fn from_workload<W: Workload>(workload: &'a W) -> Self {
        let meta = workload.meta();
        Self {
            kube_type: W::KUBE_TYPE,
            namespace: meta.namespace.as_deref().unwrap_or_default(),
            name: meta.name.as_deref().unwrap_or_default(),
            pod_spec: workload.pod_spec().unwrap_or(&EMPTY_POD_SPEC),
        }
    }

    pub fn identity(&self) -> Identity<'a> {
        Identity {
            kube_type: self.kube_type,
            namespace: self.namespace,
            name: self.name,
        }
    }

    pub fn kube_type(&self) -> KubeType {
        self.kube_type
    }

    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn pod_spec(&self) -> &'a PodSpec {
        self.pod_spec
    }

    /// Containers declared in the pod spec, in declaration order.
    pub fn containers(&self) -> &'a [Container] {
        &self.pod_spec.containers
    }

    /// The deprecated `serviceAccount` field, when set to a non-empty value.
    pub fn deprecated_service_account(&self) -> Option<&'a str> {
        non_empty(self.pod_spec.service_account.as_deref())
    }

    /// `serviceAccountName`, when set to a non-empty value.
    pub fn service_account_name(&self) -> Option<&'a str> {
        non_empty(self.pod_spec.service_account_name.as_deref())
    }

    /// The tri-state `automountServiceAccountToken` flag.
    pub fn automount_service_account_token(&self) -> Option<bool> {
        self.pod_spec.automount_service_account_token
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// The adapted items of one kind, in list order.
#[derive(Debug, Clone)]
pub struct Items<'a> {
    kube_type: KubeType,
    items: Vec<Item<'a>>,
}

impl<'a> Items<'a> {
    pub fn new<W: Workload>(list: &'a [W]) -> Self {
        Self {
            kube_type: W::KUBE_TYPE,
            items: list.iter().map(Item::from_workload).collect(),
        }
    }

    pub fn kube_type(&self) -> KubeType {
        self.kube_type
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<'a>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, 'b> IntoIterator for &'b Items<'a> {
    type Item = &'b Item<'a>;
    type IntoIter = std::slice::Iter<'b, Item<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
