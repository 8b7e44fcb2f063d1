//! Hand-rendered HTML views. No templating engine: the whole surface is one
//! list page, and every piece of user text goes through [`escape_html`].

use taskdeck_model::TodoItem;

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn item_row(item: &TodoItem) -> String {
    let title = escape_html(item.title.as_str());
    let id = item.id;
    let state_label = if item.done { "done" } else { "open" };
    let toggle_label = if item.done { "Reopen" } else { "Done" };
    format!(
        r#"      <li class="todo {state_label}">
        <span class="title">{title}</span>
        <span class="state">[{state_label}]</span>
        <form method="post" action="/todos/{id}/toggle"><button>{toggle_label}</button></form>
        <form method="post" action="/todos/{id}/edit">
          <input type="text" name="title" value="{title}" required>
          <button>Rename</button>
        </form>
        <form method="post" action="/todos/{id}/delete"><button>Delete</button></form>
      </li>
"#
    )
}

/// The single page of the application: current items plus the create form.
/// `error` carries a validation message from a rejected submission.
pub(crate) fn list_page(items: &[TodoItem], error: Option<&str>) -> String {
    let rows: String = items.iter().map(item_row).collect();
    let list = if items.is_empty() {
        "      <li class=\"empty\">Nothing to do.</li>\n".to_string()
    } else {
        rows
    };
    let banner = match error {
        Some(msg) => format!(
            "    <p class=\"error\">{}</p>\n",
            escape_html(msg)
        ),
        None => String::new(),
    };
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Taskdeck</title>
  </head>
  <body>
    <h1>Taskdeck</h1>
{banner}    <form method="post" action="/todos">
      <input type="text" name="title" placeholder="What needs doing?" required>
      <button>Add</button>
    </form>
    <ul>
{list}    </ul>
  </body>
</html>
"#
    )
}
