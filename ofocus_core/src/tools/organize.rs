//! Folders and tags.

use rmcp::model::Tool;
use serde_json::{json, Value};

use super::{list_payload, tool};
use crate::error::OmniFocusError;
use crate::lookup::EntityKind;
use crate::model::{Folder, Tag};
use crate::omnifocus::OmniFocus;
use crate::params::{CreateFolderParams, CreateTagParams, ListContainersParams};
use crate::sanitize::SafeText;
use crate::script::{folders, tags};

pub(super) fn tools() -> Vec<Tool> {
    vec![
        tool::<ListContainersParams>(
            "list_folders",
            "List Folders",
            "List all folders with their project and subfolder counts.",
        ),
        tool::<CreateFolderParams>(
            "create_folder",
            "Create Folder",
            "Create a folder at the top level or inside a parent folder (matched by name).",
        ),
        tool::<ListContainersParams>(
            "list_tags",
            "List Tags",
            "List all tags with their status and task counts.",
        ),
        tool::<CreateTagParams>(
            "create_tag",
            "Create Tag",
            "Create a tag at the top level or nested under a parent tag (matched by name).",
        ),
    ]
}

pub(super) async fn list_folders(
    of: OmniFocus,
    p: ListContainersParams,
) -> Result<Value, OmniFocusError> {
    let folders: Vec<Folder> = of.eval(folders::list_folders(p.include_dropped)).await?;
    list_payload("folders", folders)
}

pub(super) async fn create_folder(
    of: OmniFocus,
    p: CreateFolderParams,
) -> Result<Value, OmniFocusError> {
    let name = SafeText::short(&p.name)?;
    let parent = of
        .optional_id(EntityKind::Folder, None, p.parent_folder_name.as_deref())
        .await?;
    let folder: Folder = of
        .eval(folders::create_folder(&name, parent.as_ref()))
        .await?;
    Ok(json!({ "folder": folder, "created": true }))
}

pub(super) async fn list_tags(
    of: OmniFocus,
    p: ListContainersParams,
) -> Result<Value, OmniFocusError> {
    let tags: Vec<Tag> = of.eval(tags::list_tags(p.include_dropped)).await?;
    list_payload("tags", tags)
}

pub(super) async fn create_tag(of: OmniFocus, p: CreateTagParams) -> Result<Value, OmniFocusError> {
    let name = SafeText::short(&p.name)?;
    let parent = of
        .optional_id(EntityKind::Tag, None, p.parent_tag_name.as_deref())
        .await?;
    let tag: Tag = of.eval(tags::create_tag(&name, parent.as_ref())).await?;
    Ok(json!({ "tag": tag, "created": true }))
}
