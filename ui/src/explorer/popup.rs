//! Contributing-documents popup for a clicked year or category bar.

use dioxus::prelude::*;

use crate::core::state::PopupTarget;

use super::ExplorerState;

#[component]
pub fn DocumentPopup(mut state: Signal<ExplorerState>) -> Element {
    let snapshot = state();
    let Some(target) = snapshot.view.popup.clone() else {
        return rsx! {};
    };

    let heading = match &target {
        PopupTarget::Year(year) => format!("Documents in {year}"),
        PopupTarget::Category(category) if category.is_empty() => {
            "Documents without a category".to_string()
        }
        PopupTarget::Category(category) => format!("Documents in {category}"),
    };
    let docs = snapshot.popup_documents();

    rsx! {
        div { class: "explorer-popup",
            div { class: "explorer-popup__header",
                h3 { "{heading}" }
                button {
                    r#type: "button",
                    class: "explorer-popup__close",
                    onclick: move |_| state.with_mut(|explorer| explorer.close_popup()),
                    "×"
                }
            }

            if docs.is_empty() {
                p { class: "explorer-popup__placeholder", "No matching documents." }
            } else {
                ul { class: "explorer-popup__list",
                    for doc in docs.into_iter() {
                        li {
                            a {
                                id: "doc{doc.item_id}",
                                href: "{doc.href}",
                                style: "color: {doc.color}",
                                "{doc.title}"
                            }
                        }
                    }
                }
            }
        }
    }
}
