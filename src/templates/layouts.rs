use maud::{html, Markup, DOCTYPE};

pub fn page_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                header {
                    h3 { "Dormhub" }
                    nav {
                        ul {
                            li { a href="/" { "Home" } }
                            li { a href="/api/rooms" { "Rooms (JSON)" } }
                        }
                    }
                }
                (content)
            }
        }
    }
}
