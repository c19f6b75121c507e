use dioxus::prelude::*;

use crate::core::state::ViewMode;
use crate::explorer::{
    CategoryChart, DocumentPopup, ExplorerState, SearchPanel, TimeChart, TopicLegend,
    WordCloudStrip,
};

#[component]
pub fn Explorer() -> Element {
    let state = use_signal(ExplorerState::boot);
    let mode = state().view.mode;

    rsx! {
        section { class: "page page-explorer",
            SearchPanel { state }

            div { class: "explorer__surface",
                if mode == ViewMode::Categorical {
                    CategoryChart { state }
                } else {
                    TimeChart { state }
                }
                DocumentPopup { state }
            }

            TopicLegend { state }
            WordCloudStrip { state }
        }
    }
}
