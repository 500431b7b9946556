use std::rc::Rc;

use tether::indicator::{self, IndicatorConfig, IndicatorFlags, IndicatorView, LoadingBarState};
use tether::ConnectionStateStore;
use web_sys::HtmlElement;
use yew::prelude::*;

use crate::popover::{self, PopoverSurface};
use crate::scheduler::GlooScheduler;

// Built-in theme, applied when `apply_default_theme` is set
const BAR_THEME: &str = "fixed top-0 left-0 z-50 h-1 bg-blue-600 dark:bg-blue-400 pointer-events-none transition-all duration-300";
const MESSAGE_THEME: &str = "fixed top-0 left-0 z-50 w-full overflow-hidden px-2 text-xs font-semibold leading-none transition-all duration-500";
const MESSAGE_ONLINE_THEME: &str = "bg-blue-600 dark:bg-blue-500 text-white";
const MESSAGE_OFFLINE_THEME: &str = "bg-gray-800 dark:bg-gray-700 text-white";
const SPINNER_THEME: &str = "inline-block h-3 w-3 mx-2 rounded-full border-2 border-blue-400 border-r-transparent border-b-transparent animate-spin";

fn bar_stage_theme(stage: LoadingBarState) -> &'static str {
    match stage {
        LoadingBarState::Idle => "w-0 opacity-0",
        LoadingBarState::First => "w-1/2",
        LoadingBarState::Second => "w-11/12",
        LoadingBarState::Third => "w-full h-2 animate-pulse",
    }
}

fn message_state_theme(flags: &IndicatorFlags) -> &'static str {
    match (flags.offline || flags.reconnecting, flags.expanded) {
        (true, true) => "max-h-7 opacity-100",
        (true, false) => "max-h-2 opacity-100 hover:max-h-7",
        (false, true) => "max-h-7 opacity-100",
        (false, false) => "max-h-2 opacity-0",
    }
}

fn flag_attr(flag: bool) -> Option<AttrValue> {
    flag.then(|| AttrValue::from(""))
}

#[derive(Properties, PartialEq)]
pub struct ConnectionIndicatorProps {
    pub store: ConnectionStateStore,
    #[prop_or_default]
    pub config: IndicatorConfig,
}

/// Loading bar and connection status message, surfaced as a popover while there is
/// something to show.
#[function_component(ConnectionIndicator)]
pub fn connection_indicator(props: &ConnectionIndicatorProps) -> Html {
    let host_ref = use_node_ref();
    let machine = use_mut_ref(|| None::<indicator::ConnectionIndicator>);
    let force_update = use_force_update();

    use_effect_with((props.store.clone(), props.config.clone()), {
        let host_ref = host_ref.clone();
        let machine = machine.clone();
        move |(store, config): &(ConnectionStateStore, IndicatorConfig)| {
            if let Some(host) = host_ref.cast::<HtmlElement>() {
                popover::init(&host);
            }

            let indicator = indicator::ConnectionIndicator::new(
                store.clone(),
                Rc::new(GlooScheduler),
                Rc::new(PopoverSurface::new(host_ref.clone())),
                config.clone(),
            );
            indicator.mount();
            {
                let force_update = force_update.clone();
                indicator.set_on_change(move || force_update.force_update());
            }
            *machine.borrow_mut() = Some(indicator);
            force_update.force_update();

            move || {
                // Dropping the indicator unsubscribes it and clears its timers.
                let indicator = machine.borrow_mut().take();
                drop(indicator);
            }
        }
    });

    let view = machine
        .borrow()
        .as_ref()
        .map(|indicator| indicator.view())
        .unwrap_or_else(|| IndicatorView {
            flags: IndicatorFlags::default(),
            loading_bar: LoadingBarState::Idle,
            message: props.config.online_text.clone(),
            surfaced: false,
        });
    let flags = view.flags;
    let themed = props.config.apply_default_theme;
    let disconnected = flags.offline || flags.reconnecting;

    let bar_classes = classes!(
        "v-loading-indicator",
        view.loading_bar.is_visible().then_some(view.loading_bar.class_name()),
        themed.then_some(BAR_THEME),
        themed.then(|| bar_stage_theme(view.loading_bar)),
        (themed && disconnected).then_some("hidden"),
    );

    let message_classes = classes!(
        "v-status-message",
        flags.reconnecting.then_some("active"),
        themed.then_some(MESSAGE_THEME),
        themed.then(|| {
            if disconnected {
                MESSAGE_OFFLINE_THEME
            } else {
                MESSAGE_ONLINE_THEME
            }
        }),
        themed.then(|| message_state_theme(&flags)),
    );

    html! {
        <div
            ref={host_ref}
            class="connection-indicator"
            data-offline={flag_attr(flags.offline)}
            data-reconnecting={flag_attr(flags.reconnecting)}
            data-loading={flag_attr(flags.loading)}
            data-expanded={flag_attr(flags.expanded)}
        >
            <div class={bar_classes} style={view.loading_bar.display_style()}></div>

            <div class={message_classes}>
                <span class={classes!("text", themed.then_some("flex h-7 items-center justify-center"))}>
                    {
                        if themed && flags.reconnecting {
                            html! { <span class={SPINNER_THEME}></span> }
                        } else {
                            html! {}
                        }
                    }
                    { view.message.clone() }
                </span>
            </div>
        </div>
    }
}
