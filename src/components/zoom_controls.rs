use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ZoomControlsProps {
    pub level_label: AttrValue,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_today: Callback<()>,
}

#[function_component(ZoomControls)]
pub fn zoom_controls(props: &ZoomControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let today = {
        let cb = props.on_today.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:6px; align-items:center;">
        <button onclick={zo} disabled={!props.can_zoom_out} title="Zoom out">{"-"}</button>
        <span style="min-width:84px; text-align:center; font-size:12px;">{ props.level_label.clone() }</span>
        <button onclick={zi} disabled={!props.can_zoom_in} title="Zoom in">{"+"}</button>
        <span style="width:8px;"></span>
        <button onclick={today}>{"Today"}</button>
    </div>}
}
