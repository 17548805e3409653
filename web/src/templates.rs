use std::sync::OnceLock;

use axum::response::Html;
use tera::{Context, Tera};

/// All templates are compiled into the binary; parse failures are
/// programmer errors caught the first time anything renders.
fn tera() -> &'static Tera {
    static TERA: OnceLock<Tera> = OnceLock::new();

    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates([
            ("base.html", include_str!("../templates/base.html")),
            ("todo_list.html", include_str!("../templates/todo_list.html")),
            ("todo_form.html", include_str!("../templates/todo_form.html")),
            (
                "todo_confirm_delete.html",
                include_str!("../templates/todo_confirm_delete.html"),
            ),
            ("not_found.html", include_str!("../templates/not_found.html")),
        ])
        .expect("built-in templates parse");
        tera
    })
}

pub fn render(name: &str, context: &Context) -> Result<Html<String>, tera::Error> {
    Ok(Html(tera().render(name, context)?))
}
