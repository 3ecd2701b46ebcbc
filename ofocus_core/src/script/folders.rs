use super::{assemble, lookup_by_id};
use crate::lookup::EntityKind;
use crate::sanitize::SafeText;

pub fn list_folders(include_dropped: bool) -> String {
    let filter = if include_dropped {
        ""
    } else {
        "if (safe(function () { return f.hidden(); }, false)) continue;"
    };
    assemble(&format!(
        r#"
var source = doc.flattenedFolders();
var out = [];
for (var i = 0; i < source.length; i++) {{
  var f = source[i];
  {filter}
  out.push(folderToJson(f));
}}
return ok(out);
"#,
        filter = filter,
    ))
}

pub fn create_folder(name: &SafeText, parent_id: Option<&SafeText>) -> String {
    let (lookup, container) = match parent_id {
        Some(id) => (
            lookup_by_id("parent", EntityKind::Folder, id),
            "parent.folders",
        ),
        None => (String::new(), "doc.folders"),
    };
    assemble(&format!(
        r#"{lookup}
if (byName({container}, {name})) {{
  return fail("invalid", "Folder already exists: " + {name});
}}
var folder = app.Folder({{ name: {name} }});
{container}.push(folder);
return ok(folderToJson(folder));
"#,
        lookup = lookup,
        container = container,
        name = name.literal(),
    ))
}
