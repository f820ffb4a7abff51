use tabled::settings::Style;
use tabled::{Table, Tabled};
use todos_core::config::Palette;
use todos_core::view::{FooterView, Screen, TodoRow};

#[derive(Tabled)]
struct Line {
    #[tabled(rename = "#")]
    id: u64,
    #[tabled(rename = "Done")]
    status: &'static str,
    #[tabled(rename = "Title")]
    title: String,
}

fn line(row: &TodoRow, palette: &Palette) -> Line {
    let mut title = if row.completed {
        palette.mutedize(&row.title)
    } else {
        row.title.clone()
    };
    if row.loading {
        title.push_str(" (working...)");
    }

    Line {
        id: row.id,
        status: if row.completed { "[x]" } else { "[ ]" },
        title,
    }
}

fn footer_line(footer: &FooterView, palette: &Palette) -> String {
    let links: Vec<String> = footer
        .filters
        .iter()
        .map(|link| {
            if link.selected {
                palette.accentize(&format!("[{}]", link.label))
            } else {
                link.label.to_string()
            }
        })
        .collect();

    let clear = if footer.clear_completed.disabled {
        palette.mutedize("(clear completed)")
    } else {
        "clear completed".to_string()
    };

    format!("{}  {}  {}", footer.counter, links.join(" "), clear)
}

pub fn render_plain(screen: &Screen, palette: &Palette) -> String {
    let mut lines = Vec::new();

    let toggle = if screen.header.toggle_all.active {
        "[v]"
    } else {
        "[ ]"
    };
    let field = &screen.header.new_todo;
    let input = if field.value.is_empty() {
        palette.mutedize(field.placeholder)
    } else {
        field.value.clone()
    };
    lines.push(format!("{toggle} {input}"));

    if screen.loading {
        lines.push("Loading...".to_string());
    } else if !screen.todos.is_empty() {
        let rows: Vec<Line> = screen.todos.iter().map(|row| line(row, palette)).collect();
        lines.push(Table::new(rows).with(Style::blank()).to_string());
    }

    if let Some(footer) = screen.footer.as_ref() {
        lines.push(footer_line(footer, palette));
    }

    if !screen.notification.hidden {
        lines.push(palette.alertize(&format!("! {}", screen.notification.message)));
    }

    lines.join("\n")
}

pub fn render_json(screen: &Screen) -> String {
    serde_json::to_string(screen).unwrap_or_else(|err| {
        serde_json::json!({ "error": err.to_string() }).to_string()
    })
}
