//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern. Builds small
//! registry projects on disk: a manifest, bundle sources and a category map.

#![allow(dead_code)]

use kata_registry_core::index::{
    BuildOutput, CategoryMap, IndexBuilder, RegistryManifest,
};
use kata_registry_core::server::{RegistrySnapshot, RegistryStore};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests (only once per test run)
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Write a file relative to the project root, creating parents
pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

/// A project with a template, `button`, `card` (imports button) and
/// `hero1` (imports a shared component and lucide-react)
pub fn create_sample_project(root: &Path) {
    write_file(
        root,
        "registry/new-york/hello-world/hello-world.tsx",
        "export function HelloWorld() {\n  return <p>Hello</p>;\n}\n",
    );
    write_file(
        root,
        "registry/blocks/button/button.tsx",
        "import { cn } from \"@/lib/utils\";\n\nexport function Button({ className }) {\n  return <button className={cn(\"btn\", className)} />;\n}\n",
    );
    write_file(
        root,
        "registry/blocks/card/card.tsx",
        "import { Button } from \"@/registry/blocks/button/button\";\n\nexport function Card() {\n  return <div><Button /></div>;\n}\n",
    );
    write_file(
        root,
        "registry/components/shared/logo.tsx",
        "export function Logo() {\n  return <svg />;\n}\n",
    );
    write_file(
        root,
        "registry/blocks/hero1/hero1.tsx",
        "import { ArrowRight } from \"lucide-react\";\nimport { Logo } from \"@/components/shared/logo\";\n\nexport function Hero1() {\n  return <section><Logo /><ArrowRight /></section>;\n}\n",
    );

    write_file(root, "registry.json", &sample_manifest_json());
    write_file(
        root,
        "lib/category-collapse.json",
        "{\n  \"button\": \"Actions\",\n  \"card\": \"Layout\",\n  \"hero\": \"Hero\"\n}\n",
    );
}

pub fn sample_manifest_json() -> String {
    serde_json::to_string_pretty(&serde_json::json!({
        "$schema": "https://ui.shadcn.com/schema/registry.json",
        "name": "shadcn-registry",
        "homepage": "https://example.com",
        "items": [
            {
                "name": "hello-world",
                "type": "registry:block",
                "title": "Hello World",
                "description": "Template",
                "files": [{"path": "registry/new-york/hello-world/hello-world.tsx", "type": "registry:component"}]
            },
            {
                "name": "button",
                "type": "registry:block",
                "title": "Button",
                "description": "A button",
                "tags": ["action", "form", "action"],
                "files": [{"path": "registry/blocks/button/button.tsx", "type": "registry:block"}]
            },
            {
                "name": "card",
                "type": "registry:block",
                "title": "Card",
                "description": "A card with a button",
                "registryDependencies": ["@kata-shadcn/button"],
                "files": [{"path": "registry/blocks/card/card.tsx", "type": "registry:block"}]
            },
            {
                "name": "hero1",
                "type": "registry:block",
                "title": "Hero 1",
                "description": "Landing hero",
                "dependencies": ["lucide-react"],
                "files": [
                    {"path": "registry/blocks/hero1/hero1.tsx", "type": "registry:block"},
                    {"path": "registry/components/shared/logo.tsx", "type": "registry:component"}
                ]
            }
        ]
    }))
    .unwrap()
}

/// Build the sample project in `root`
pub async fn build_sample(root: &Path) -> BuildOutput {
    let manifest = RegistryManifest::from_file(&root.join("registry.json")).unwrap();
    let categories = CategoryMap::from_file(&root.join("lib/category-collapse.json")).unwrap();

    IndexBuilder::new(root, categories)
        .build(&manifest)
        .await
        .unwrap()
}

/// A store serving the sample project
pub async fn sample_store(root: &Path) -> Arc<RegistryStore> {
    create_sample_project(root);
    let output = build_sample(root).await;
    Arc::new(RegistryStore::new(RegistrySnapshot::from_build(&output).unwrap()))
}
