use super::{assemble, lookup_by_id};
use crate::lookup::EntityKind;
use crate::sanitize::SafeText;

pub fn list_tags(include_dropped: bool) -> String {
    let filter = if include_dropped {
        ""
    } else {
        "if (safe(function () { return g.hidden(); }, false)) continue;"
    };
    assemble(&format!(
        r#"
var source = doc.flattenedTags();
var out = [];
for (var i = 0; i < source.length; i++) {{
  var g = source[i];
  {filter}
  out.push(tagToJson(g));
}}
return ok(out);
"#,
        filter = filter,
    ))
}

pub fn create_tag(name: &SafeText, parent_id: Option<&SafeText>) -> String {
    let (lookup, container) = match parent_id {
        Some(id) => (lookup_by_id("parent", EntityKind::Tag, id), "parent.tags"),
        None => (String::new(), "doc.tags"),
    };
    assemble(&format!(
        r#"{lookup}
if (byName({container}, {name})) {{
  return fail("invalid", "Tag already exists: " + {name});
}}
var tag = app.Tag({{ name: {name} }});
{container}.push(tag);
return ok(tagToJson(tag));
"#,
        lookup = lookup,
        container = container,
        name = name.literal(),
    ))
}
