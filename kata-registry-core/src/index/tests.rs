//! Integration tests for the index module

#[cfg(test)]
mod integration_tests {
    use crate::index::{
        CategoryMap, IndexBuilder, IndexError, RegistryManifest, RenderedArtifacts,
    };
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn card_and_button(root: &Path) {
        write(
            root,
            "registry/blocks/button/button.tsx",
            "import { cn } from \"@/lib/utils\";\n\nexport function Button() {\n  return <button className={cn(\"btn\")} />;\n}\n",
        );
        write(
            root,
            "registry/blocks/card/card.tsx",
            "import * as React from \"react\";\nimport { Button } from \"@/registry/blocks/button/button\";\nimport { CardBody } from \"./card-body\";\n\nexport function Card() {\n  return <CardBody><Button /></CardBody>;\n}\n",
        );
        write(
            root,
            "registry/blocks/card/card-body.tsx",
            "export function CardBody(props) {\n  return <div {...props} />;\n}",
        );
    }

    fn manifest(with_button: bool) -> RegistryManifest {
        let mut items = vec![serde_json::json!({
            "name": "card",
            "title": "Card",
            "description": "A card",
            "files": [
                {"path": "registry/blocks/card/card.tsx", "type": "registry:block"},
                {"path": "registry/blocks/card/card-body.tsx", "type": "registry:block"}
            ]
        })];
        if with_button {
            items.push(serde_json::json!({
                "name": "button",
                "title": "Button",
                "description": "A button",
                "files": [{"path": "registry/blocks/button/button.tsx", "type": "registry:block"}]
            }));
        }
        serde_json::from_value(serde_json::json!({ "items": items })).unwrap()
    }

    /// card imports button; both build and the graph is closed
    #[tokio::test]
    async fn test_card_imports_button() {
        let temp_dir = TempDir::new().unwrap();
        card_and_button(temp_dir.path());

        let output = IndexBuilder::new(temp_dir.path(), CategoryMap::default())
            .build(&manifest(true))
            .await
            .unwrap();

        let card = output.index.get("card").unwrap();
        let button = output.index.get("button").unwrap();

        assert_eq!(card.peer_components, vec!["button".to_string()]);
        assert!(button.peer_components.is_empty());

        // card: react and button; ./card-body is internal
        assert_eq!(card.complexity.files, 2);
        assert_eq!(card.complexity.lines, 10);
        assert_eq!(card.complexity.dependencies, 2);
        assert_eq!(button.complexity.dependencies, 1);

        assert_eq!(card.category, "card");
        assert_eq!(card.install_command, "npx shadcn add @kata-shadcn/card");
        assert_ne!(card.content_hash, button.content_hash);
    }

    /// Dropping button while card still imports it fails the build
    #[tokio::test]
    async fn test_removed_peer_is_dangling() {
        let temp_dir = TempDir::new().unwrap();
        card_and_button(temp_dir.path());
        fs::remove_dir_all(temp_dir.path().join("registry/blocks/button")).unwrap();

        let err = IndexBuilder::new(temp_dir.path(), CategoryMap::default())
            .build(&manifest(false))
            .await
            .unwrap_err();

        match err {
            IndexError::DanglingPeer { component, peer } => {
                assert_eq!(component, "card");
                assert_eq!(peer, "button");
            }
            other => panic!("expected dangling peer, got: {other}"),
        }
    }

    /// Rebuilding unchanged sources yields byte-identical artifacts
    #[tokio::test]
    async fn test_rebuild_is_reproducible() {
        let temp_dir = TempDir::new().unwrap();
        card_and_button(temp_dir.path());
        let builder = IndexBuilder::new(temp_dir.path(), CategoryMap::default());

        let first = RenderedArtifacts::render(&builder.build(&manifest(true)).await.unwrap()).unwrap();
        let second = RenderedArtifacts::render(&builder.build(&manifest(true)).await.unwrap()).unwrap();

        assert_eq!(first, second);
    }

    /// A single changed byte changes only that component's hash
    #[tokio::test]
    async fn test_hash_tracks_content() {
        let temp_dir = TempDir::new().unwrap();
        card_and_button(temp_dir.path());
        let builder = IndexBuilder::new(temp_dir.path(), CategoryMap::default());

        let before = builder.build(&manifest(true)).await.unwrap().index;
        write(
            temp_dir.path(),
            "registry/blocks/card/card-body.tsx",
            "export function CardBody(props) {\n  return <section {...props} />;\n}",
        );
        let after = builder.build(&manifest(true)).await.unwrap().index;

        assert_ne!(
            before.get("card").unwrap().content_hash,
            after.get("card").unwrap().content_hash
        );
        assert_eq!(
            before.get("button").unwrap().content_hash,
            after.get("button").unwrap().content_hash
        );
    }

    /// Mutual imports form a cycle; the build accepts it
    #[tokio::test]
    async fn test_cycles_are_accepted() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "registry/blocks/tabs/tabs.tsx",
            "import { Panel } from \"@kata-shadcn/panel\";\n",
        );
        write(
            temp_dir.path(),
            "registry/blocks/panel/panel.tsx",
            "import { Tabs } from \"@/registry/blocks/tabs/tabs\";\n",
        );

        let manifest: RegistryManifest = serde_json::from_value(serde_json::json!({
            "items": [
                {"name": "tabs", "files": [{"path": "registry/blocks/tabs/tabs.tsx"}]},
                {"name": "panel", "files": [{"path": "registry/blocks/panel/panel.tsx"}]}
            ]
        }))
        .unwrap();

        let output = IndexBuilder::new(temp_dir.path(), CategoryMap::default())
            .build(&manifest)
            .await
            .unwrap();

        assert_eq!(output.index.transitive_peers("tabs").unwrap(), vec!["panel"]);
        assert_eq!(output.index.transitive_peers("panel").unwrap(), vec!["tabs"]);
    }

    /// Categories come from the collapse map when the manifest is silent
    #[tokio::test]
    async fn test_collapse_map_categories() {
        let temp_dir = TempDir::new().unwrap();
        card_and_button(temp_dir.path());
        let map = CategoryMap::from_json(r#"{"card": "Cards", "button": "Buttons"}"#).unwrap();

        let output = IndexBuilder::new(temp_dir.path(), map)
            .build(&manifest(true))
            .await
            .unwrap();

        assert_eq!(output.index.categories(), vec!["Buttons", "Cards"]);
        // one component per category sits exactly at ceil(2 * 0.15) = 1
        assert!(output.report.oversized.is_empty());
    }
}
