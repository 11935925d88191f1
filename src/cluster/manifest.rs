//! Workload snapshots from YAML manifests.
//!
//! Accepts the same documents `kubectl apply` does, multi-document files,
//! and `List` documents as produced by `kubectl get -o yaml`.

use crate::audit::{KubeType, Snapshot, Workload};
use crate::cluster::standalone_pods;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Errors reading manifests.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML syntax error in {path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Parse YAML content into a snapshot.
///
/// Documents of other kinds are skipped. A workload document that does not
/// deserialize is logged and skipped.
pub fn parse_manifest(content: &str, path: &Path) -> Result<Snapshot, ManifestError> {
    let mut snapshot = Snapshot::default();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document).map_err(|source| ManifestError::Syntax {
            path: path.to_path_buf(),
            source,
        })?;
        add_document(&mut snapshot, value, path);
    }
    snapshot.pods = standalone_pods(std::mem::take(&mut snapshot.pods));
    Ok(snapshot)
}

/// Parse a single manifest file.
pub fn load_file(path: &Path) -> Result<Snapshot, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&content, path)
}

/// Load files and directories (recursively, `.yaml`/`.yml` only) into one
/// snapshot. Directory entries are visited in file-name order.
pub fn load_paths(paths: &[PathBuf]) -> Result<Snapshot, ManifestError> {
    let mut snapshot = Snapshot::default();
    for path in paths {
        if !path.is_dir() {
            snapshot.extend(load_file(path)?);
            continue;
        }
        for entry in walkdir::WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| ManifestError::Walk {
                path: path.clone(),
                source,
            })?;
            let ext = entry.path().extension().and_then(|e| e.to_str());
            if entry.file_type().is_file() && matches!(ext, Some("yaml") | Some("yml")) {
                snapshot.extend(load_file(entry.path())?);
            }
        }
    }
    Ok(snapshot)
}

fn add_document(snapshot: &mut Snapshot, value: Value, path: &Path) {
    if value.is_null() {
        return;
    }
    let Some(kind) = value.get("kind").and_then(Value::as_str).map(str::to_string) else {
        log::debug!("skipping document without kind in {}", path.display());
        return;
    };

    if kind.ends_with("List") {
        if let Some(Value::Sequence(items)) = value.get("items") {
            for item in items.clone() {
                add_document(snapshot, item, path);
            }
        }
        return;
    }

    match KubeType::from_kind(&kind) {
        Some(KubeType::Pod) => push(&mut snapshot.pods, value, path),
        Some(KubeType::Deployment) => push(&mut snapshot.deployments, value, path),
        Some(KubeType::StatefulSet) => push(&mut snapshot.stateful_sets, value, path),
        Some(KubeType::DaemonSet) => push(&mut snapshot.daemon_sets, value, path),
        Some(KubeType::ReplicationController) => {
            push(&mut snapshot.replication_controllers, value, path)
        }
        None => log::debug!("skipping {} in {}", kind, path.display()),
    }
}

fn push<W: Workload>(list: &mut Vec<W>, value: Value, path: &Path) {
    match serde_yaml::from_value::<W>(value) {
        Ok(object) => list.push(object),
        Err(err) => log::warn!(
            "skipping malformed {} in {}: {}",
            W::KUBE_TYPE,
            path.display(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DEPLOYMENT: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
  namespace: prod
spec:
  selector:
    matchLabels:
      app: api
  template:
    metadata:
      labels:
        app: api
    spec:
      containers:
      - name: api
        image: api:1.0
"#;

    #[test]
    fn test_multi_document_manifest() {
        let content = format!(
            "{DEPLOYMENT}\n---\napiVersion: v1\nkind: Service\nmetadata:\n  name: api\n---\napiVersion: v1\nkind: Pod\nmetadata:\n  name: debug\nspec:\n  containers:\n  - name: sh\n    image: busybox\n"
        );
        let snapshot = parse_manifest(&content, Path::new("test.yaml")).unwrap();
        assert_eq!(snapshot.deployments.len(), 1);
        assert_eq!(snapshot.pods.len(), 1);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.deployments[0].metadata.name.as_deref(), Some("api"));
    }

    #[test]
    fn test_list_documents_are_expanded() {
        let content = r#"
apiVersion: v1
kind: List
items:
- apiVersion: apps/v1
  kind: DaemonSet
  metadata:
    name: agent
  spec:
    selector:
      matchLabels:
        app: agent
    template:
      spec:
        containers:
        - name: agent
          image: agent:2
- apiVersion: v1
  kind: ReplicationController
  metadata:
    name: legacy
  spec:
    template:
      spec:
        containers:
        - name: legacy
          image: legacy:1
"#;
        let snapshot = parse_manifest(content, Path::new("list.yaml")).unwrap();
        assert_eq!(snapshot.daemon_sets.len(), 1);
        assert_eq!(snapshot.replication_controllers.len(), 1);
    }

    #[test]
    fn test_owned_pods_are_dropped() {
        let content = r#"
apiVersion: v1
kind: Pod
metadata:
  name: api-7d9f
  ownerReferences:
  - apiVersion: apps/v1
    kind: ReplicaSet
    name: api-7d9
    uid: 0b6f3c2e-1111-2222-3333-444455556666
spec:
  containers:
  - name: api
    image: api:1.0
"#;
        let snapshot = parse_manifest(content, Path::new("pod.yaml")).unwrap();
        assert!(snapshot.pods.is_empty());
    }

    #[test]
    fn test_malformed_workload_is_skipped() {
        let content = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: broken\nspec: 42\n";
        let snapshot = parse_manifest(content, Path::new("broken.yaml")).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = parse_manifest("kind: [unclosed", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::Syntax { .. }));
    }

    #[test]
    fn test_load_paths_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.yaml"), DEPLOYMENT).unwrap();
        fs::write(
            dir.path().join("nested/b.yml"),
            DEPLOYMENT.replace("name: api\n  namespace", "name: worker\n  namespace"),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "kind: Deployment").unwrap();

        let snapshot = load_paths(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = snapshot
            .deployments
            .iter()
            .filter_map(|d| d.metadata.name.as_deref())
            .collect();
        assert_eq!(names, vec!["api", "worker"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_paths(&[PathBuf::from("/nonexistent/kubeaudit.yaml")]).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
