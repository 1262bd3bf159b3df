use chrono::{DateTime, Duration, Utc};
use yew::prelude::*;

use crate::model::{FlowDirection, ItemKind, TimelineItem};

/// Which affordance a double-clicked pin asked for.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalRequest {
    Editor(TimelineItem),
    GoalAction(TimelineItem),
}

impl ModalRequest {
    pub fn item(&self) -> &TimelineItem {
        match self {
            ModalRequest::Editor(item) | ModalRequest::GoalAction(item) => item,
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct ItemModalProps {
    pub request: Option<ModalRequest>,
    pub now: DateTime<Utc>,
    pub on_close: Callback<()>,
    pub on_reschedule: Callback<(String, DateTime<Utc>)>,
    pub on_focus_story: Callback<String>,
}

fn kind_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Event => "Event",
        ItemKind::Goal => "Goal",
        ItemKind::Exercise => "Exercise",
        ItemKind::Financial => "Financial",
    }
}

#[function_component]
pub fn ItemModal(props: &ItemModalProps) -> Html {
    let Some(request) = &props.request else {
        return html! {};
    };
    let item = request.item();

    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let move_cb = |at: DateTime<Utc>| {
        let cb = props.on_reschedule.clone();
        let close = props.on_close.clone();
        let id = item.id.clone();
        Callback::from(move |_| {
            cb.emit((id.clone(), at));
            close.emit(());
        })
    };
    let story_cb = {
        let cb = props.on_focus_story.clone();
        let close = props.on_close.clone();
        let id = item.id.clone();
        Callback::from(move |_| {
            cb.emit(id.clone());
            close.emit(());
        })
    };

    let details = html! {<div style="display:flex; flex-direction:column; gap:4px; font-size:13px;">
        <div>{ format!("{} · {}", kind_label(item.kind), item.category_id) }</div>
        <div>{ item.timestamp.format("%a %b %d, %Y %H:%M").to_string() }</div>
        <div>{ format!("Mood {:+}", item.mood) }</div>
        { if let Some(f) = item.financial {
            let sign = if f.direction == FlowDirection::Inflow { "+" } else { "-" };
            html!{ <div>{ format!("Amount {sign}{:.2}", f.amount) }</div> }
        } else { html!{} } }
        { if let Some(created) = item.created_at {
            html!{ <div style="opacity:0.7;">{ format!("Set on {}", created.format("%b %d, %Y")) }</div> }
        } else { html!{} } }
    </div>};

    let actions = match request {
        ModalRequest::GoalAction(_) => html! {<div style="display:flex; gap:8px; flex-wrap:wrap;">
            <button onclick={move_cb(props.now)} style="background:#2ea043; border:1px solid #238636; color:#fff; flex:1;">{"Reached it today"}</button>
            <button onclick={move_cb(item.timestamp + Duration::days(7))} style="flex:1;">{"Push back a week"}</button>
            <button onclick={move_cb(item.timestamp + Duration::days(30))} style="flex:1;">{"Push back a month"}</button>
        </div>},
        ModalRequest::Editor(_) => html! {<div style="display:flex; gap:8px; flex-wrap:wrap;">
            <button onclick={move_cb(item.timestamp - Duration::days(1))} style="flex:1;">{"A day earlier"}</button>
            <button onclick={move_cb(item.timestamp + Duration::days(1))} style="flex:1;">{"A day later"}</button>
        </div>},
    };

    html! {<div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.55); z-index:50;">
        <div style="background:#161b22; border:1px solid #30363d; border-radius:12px; padding:16px 20px; min-width:340px; max-width:480px; display:flex; flex-direction:column; gap:14px;">
            <div style="display:flex; justify-content:space-between; align-items:center;">
                <h3 style="margin:0; font-size:18px;">{ item.title.clone() }</h3>
                <button onclick={close_cb.clone()} style="padding:4px 8px;">{"Close"}</button>
            </div>
            { details }
            { actions }
            <div style="display:flex; gap:8px;">
                <button onclick={story_cb} style="flex:1;">{"Follow this story"}</button>
                <button onclick={close_cb} style="flex:0 0 auto;">{"Done"}</button>
            </div>
        </div>
    </div>}
}
