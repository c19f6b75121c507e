use dioxus::prelude::*;

#[component]
pub fn Home() -> Element {
    rsx! {
        section { class: "page page-home",
            h1 { "Themescope" }
            p { "An interactive explorer for topic-model output over a document corpus." }
            p {
                "Feed it precomputed per-topic time series, document metadata, and a search "
                "index; it draws streamgraphs, standardized trend lines, and categorical "
                "breakdowns you can filter, compare, and share."
            }

            ul { class: "page-home__features",
                li { "Streaming, standardized, and categorical chart modes" }
                li { "Side-by-side search lanes over an inverted index" }
                li { "Word clouds, document popups, and a shareable URL for any view" }
            }
            p { class: "page-home__cta",
                "Open the Explorer to browse the bundled demo corpus, or inline your own."
            }
        }
    }
}
