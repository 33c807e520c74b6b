/// Reusable UI components

use yew::prelude::*;
use patternfly_yew::prelude::*;
use crate::product::{TrackedProduct, format_price};

#[derive(Properties, PartialEq)]
pub struct StatItemProps {
    pub label: String,
    pub value: f64,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(StatItem)]
pub fn stat_item(props: &StatItemProps) -> Html {
    html! {
        <div class="stat-item">
            <span class="stat-label">{&props.label}</span>
            <span class={classes!("stat-value", props.class.clone())}>
                {format_price(props.value)}
            </span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProductCardProps {
    pub url: String,
    pub product: TrackedProduct,
    pub on_view: Callback<String>,
    pub on_remove: Callback<String>,
}

#[function_component(ProductCard)]
pub fn product_card(props: &ProductCardProps) -> Html {
    let product = &props.product;

    // Stored records always have at least one price
    let Some(stats) = product.stats() else {
        return html! {};
    };

    let on_view = props.on_view.reform({
        let url = props.url.clone();
        move |_: MouseEvent| url.clone()
    });
    let on_remove = props.on_remove.reform({
        let url = props.url.clone();
        move |_: MouseEvent| url.clone()
    });

    html! {
        <div class="product-card">
            <div class="product-title" title={props.url.clone()}>{&product.title}</div>
            <div class="product-stats">
                <StatItem label="Current" value={stats.current} class={classes!("current")} />
                <StatItem label="Lowest" value={stats.lowest} class={classes!("lowest")} />
                <StatItem label="Highest" value={stats.highest} />
            </div>
            <div class="product-actions">
                <Button onclick={on_view} variant={ButtonVariant::Secondary}>
                    {"View Product"}
                </Button>
                <Button onclick={on_remove} variant={ButtonVariant::Danger}>
                    {"Remove"}
                </Button>
            </div>
        </div>
    }
}
