use yew::prelude::*;

use crate::config::{EngineConfig, Layer};

#[derive(Properties, PartialEq, Clone)]
struct LayerRowProps {
    color: String,
    label: &'static str,
    checked: bool,
    on_toggle: Callback<()>,
}

#[function_component(LayerRow)]
fn layer_row(props: &LayerRowProps) -> Html {
    let toggle = {
        let cb = props.on_toggle.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! { <label style="display:flex; align-items:center; gap:8px; margin:3px 0; cursor:pointer;">
        <input type="checkbox" checked={props.checked} onclick={toggle} />
        <span style={format!("display:inline-block; width:12px; height:12px; background:{}; border:1px solid #30363d; border-radius:2px;", props.color)}></span>
        <span>{ props.label }</span>
    </label> }
}

#[derive(Properties, PartialEq, Clone)]
pub struct LayerLegendProps {
    pub config: EngineConfig,
    pub on_toggle: Callback<Layer>,
}

/// Swatch plus checkbox for each optional overlay.
#[function_component(LayerLegend)]
pub fn layer_legend(props: &LayerLegendProps) -> Html {
    let palette = &props.config.palette;
    let swatch = |layer: Layer| match layer {
        Layer::Intensity => palette.flow,
        Layer::Financial => palette.financial,
        Layer::Comparison => palette.comparison,
        Layer::Projected => palette.projected,
        Layer::Chapters => palette.anticipation,
        Layer::Patterns => palette.pattern_insight,
        Layer::Annotations => palette.annotation,
        Layer::Trajectories => palette.default_pin,
        Layer::Connections => palette.axis_text,
    };
    html! {<div style="position:absolute; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:170px; font-size:12px;">
        <div style="font-weight:600; margin-bottom:4px;">{"Layers"}</div>
        { for Layer::ALL.iter().map(|&layer| {
            let cb = props.on_toggle.clone();
            html! { <LayerRow
                color={swatch(layer).css()}
                label={layer.label()}
                checked={props.config.layers.get(layer)}
                on_toggle={Callback::from(move |()| cb.emit(layer))}
            /> }
        }) }
        <div style="font-size:11px; color:#8b949e; margin-top:6px;">{"Double-click a pin to edit, shift+double-click to follow its story."}</div>
    </div>}
}
