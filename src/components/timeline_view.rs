use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window};
use yew::prelude::*;

use super::zoom_controls::ZoomControls;
use crate::config::EngineConfig;
use crate::engine::EngineRequest;
use crate::error::EngineError;
use crate::model::{Journal, TimelineItem, ZOOM_LEVELS, from_ms};
use crate::render::{self, Scene};
use crate::state::{RenderState, ViewSnapshot};
use crate::util;

#[derive(Properties, PartialEq, Clone)]
pub struct TimelineViewProps {
    pub journal: UseReducerHandle<Journal>,
    pub config: EngineConfig,
    #[prop_or_default]
    pub story_focus: Option<String>,
    #[prop_or_default]
    pub initial_view: Option<ViewSnapshot>,
    pub on_reschedule: Callback<(String, DateTime<Utc>)>,
    pub on_create_annotation: Callback<DateTime<Utc>>,
    pub on_open_editor: Callback<TimelineItem>,
    pub on_open_goal_action: Callback<TimelineItem>,
    pub on_clear_story_focus: Callback<()>,
    pub on_set_story_focus: Callback<String>,
    pub on_view_change: Callback<ViewSnapshot>,
}

/// Host callbacks from the latest render. Listeners installed at mount read them
/// through a shared cell so they never hold stale props.
#[derive(Clone)]
struct Outlets {
    on_reschedule: Callback<(String, DateTime<Utc>)>,
    on_create_annotation: Callback<DateTime<Utc>>,
    on_open_editor: Callback<TimelineItem>,
    on_open_goal_action: Callback<TimelineItem>,
    on_clear_story_focus: Callback<()>,
    on_set_story_focus: Callback<String>,
    on_view_change: Callback<ViewSnapshot>,
    zoom_index: UseStateHandle<usize>,
}

impl Outlets {
    fn new(props: &TimelineViewProps, zoom_index: UseStateHandle<usize>) -> Self {
        Self {
            on_reschedule: props.on_reschedule.clone(),
            on_create_annotation: props.on_create_annotation.clone(),
            on_open_editor: props.on_open_editor.clone(),
            on_open_goal_action: props.on_open_goal_action.clone(),
            on_clear_story_focus: props.on_clear_story_focus.clone(),
            on_set_story_focus: props.on_set_story_focus.clone(),
            on_view_change: props.on_view_change.clone(),
            zoom_index,
        }
    }

    fn dispatch(&self, requests: Vec<EngineRequest>) {
        for request in requests {
            match request {
                EngineRequest::Reschedule { item_id, at } => self.on_reschedule.emit((item_id, at)),
                EngineRequest::CreateAnnotation { at } => self.on_create_annotation.emit(at),
                EngineRequest::OpenEditor(item) => self.on_open_editor.emit(item),
                EngineRequest::OpenGoalAction(item) => self.on_open_goal_action.emit(item),
                EngineRequest::ClearStoryFocus => self.on_clear_story_focus.emit(()),
                EngineRequest::SetStoryFocus(id) => self.on_set_story_focus.emit(id),
                EngineRequest::ViewChange { zoom_index, center } => {
                    self.zoom_index.set(zoom_index);
                    self.on_view_change.emit(ViewSnapshot { zoom_index, center });
                }
            }
        }
    }
}

/// Clones the outlets out of the cell first, so a callback that re-renders the
/// component can update the cell freely.
fn dispatch(outlets: &RefCell<Outlets>, requests: Vec<EngineRequest>) {
    if requests.is_empty() {
        return;
    }
    let outlets = outlets.borrow().clone();
    outlets.dispatch(requests);
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Box<dyn AsRef<JsValue>>,
}

impl Listener {
    fn attach<T>(target: &EventTarget, event: &'static str, closure: Closure<T>) -> Result<Self, EngineError>
    where
        T: ?Sized + WasmClosure + 'static,
    {
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback: Box::new(closure),
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let callback: &JsValue = (*self.callback).as_ref();
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, callback.unchecked_ref());
    }
}

/// Everything installed at mount. Dropping it stops the frame loop and removes
/// every listener.
struct Mounted {
    window: Window,
    raf_id: Rc<RefCell<Option<i32>>>,
    frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    _listeners: Vec<Listener>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(id) = self.raf_id.borrow_mut().take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        // The frame closure holds its own cell; release it to break the cycle.
        self.frame.borrow_mut().take();
        log::debug!("timeline view unmounted");
    }
}

#[derive(Clone)]
struct Shared {
    canvas: HtmlCanvasElement,
    state: Rc<RefCell<RenderState>>,
    scene: Rc<RefCell<Scene>>,
    config: Rc<RefCell<EngineConfig>>,
    outlets: Rc<RefCell<Outlets>>,
}

impl Shared {
    fn local_point(&self, client_x: i32, client_y: i32) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (client_x as f64 - rect.left(), client_y as f64 - rect.top())
    }

    fn sync_cursor(&self) {
        let cursor = self.state.borrow().cursor;
        let _ = self.canvas.style().set_property("cursor", cursor.css());
    }

    /// Matches the canvas bitmap to its container.
    fn fit_canvas(&self, window: &Window) {
        let (w, h) = match self.canvas.parent_element() {
            Some(parent) if parent.client_width() > 0 => (parent.client_width() as f64, parent.client_height() as f64),
            _ => (
                window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
                window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
            ),
        };
        self.canvas.set_width(w.max(1.0) as u32);
        self.canvas.set_height(h.max(1.0) as u32);
        self.state.borrow_mut().viewport.resize(w, h);
    }

    fn paint(&self) -> Result<(), EngineError> {
        let ctx = render::context_2d(&self.canvas)?;
        let mut state = self.state.borrow_mut();
        render::draw_frame(&ctx, &mut state, &self.scene.borrow(), &self.config.borrow(), util::now_ms());
        Ok(())
    }
}

fn mount(shared: Shared) -> Result<Mounted, EngineError> {
    let window = web_sys::window().ok_or_else(|| EngineError::Js("no window".into()))?;
    shared.fit_canvas(&window);

    // Frame loop
    let raf_id = Rc::new(RefCell::new(None));
    let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    {
        let shared = shared.clone();
        let window_loop = window.clone();
        let raf_id_loop = raf_id.clone();
        let frame_loop = frame.clone();
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Err(err) = shared.paint() {
                log::debug!("frame skipped: {err}");
            }
            if let Some(cb) = frame_loop.borrow().as_ref() {
                if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    *raf_id_loop.borrow_mut() = Some(id);
                }
            }
        }) as Box<dyn FnMut()>));
    }
    if let Some(cb) = frame.borrow().as_ref() {
        *raf_id.borrow_mut() = Some(window.request_animation_frame(cb.as_ref().unchecked_ref())?);
    }

    let canvas: &EventTarget = &shared.canvas;
    let win: &EventTarget = &window;
    let mut listeners = Vec::new();

    let mousedown_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            if e.button() != 0 {
                return;
            }
            let (x, y) = shared.local_point(e.client_x(), e.client_y());
            let requests = shared.state.borrow_mut().pointer_down(x, y);
            shared.sync_cursor();
            dispatch(&shared.outlets, requests);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "mousedown", mousedown_cb)?);

    // Move and release are tracked on the window so a drag survives leaving the canvas.
    let mousemove_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            let (x, y) = shared.local_point(e.client_x(), e.client_y());
            shared.state.borrow_mut().pointer_move(x, y);
            shared.sync_cursor();
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(win, "mousemove", mousemove_cb)?);

    let mouseup_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            if shared.state.borrow().mode.is_idle() {
                return;
            }
            let (x, _) = shared.local_point(e.client_x(), e.client_y());
            let requests = shared.state.borrow_mut().pointer_up(x);
            shared.sync_cursor();
            dispatch(&shared.outlets, requests);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(win, "mouseup", mouseup_cb)?);

    let mouseleave_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |_e: MouseEvent| {
            let mut state = shared.state.borrow_mut();
            if state.mode.is_idle() {
                state.hover = None;
            }
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "mouseleave", mouseleave_cb)?);

    let dblclick_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
            let (x, y) = shared.local_point(e.client_x(), e.client_y());
            let requests = {
                let scene = shared.scene.borrow();
                shared
                    .state
                    .borrow_mut()
                    .double_click(x, y, e.shift_key(), &scene.journal.items)
            };
            dispatch(&shared.outlets, requests);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "dblclick", dblclick_cb)?);

    let wheel_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |e: WheelEvent| {
            e.prevent_default();
            let requests = shared.state.borrow_mut().wheel(e.delta_y());
            dispatch(&shared.outlets, requests);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "wheel", wheel_cb)?);

    let resize_cb = {
        let shared = shared.clone();
        let window = window.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            shared.fit_canvas(&window);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(win, "resize", resize_cb)?);

    // Touch: one finger drives the same state machine as the mouse.
    let last_touch_x = Rc::new(RefCell::new(0.0_f64));
    let touch_start_cb = {
        let shared = shared.clone();
        let last_touch_x = last_touch_x.clone();
        Closure::wrap(Box::new(move |e: TouchEvent| {
            if e.touches().length() != 1 {
                return;
            }
            let Some(t0) = e.touches().item(0) else {
                return;
            };
            e.prevent_default();
            let (x, y) = shared.local_point(t0.client_x(), t0.client_y());
            *last_touch_x.borrow_mut() = x;
            let requests = shared.state.borrow_mut().pointer_down(x, y);
            dispatch(&shared.outlets, requests);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "touchstart", touch_start_cb)?);

    let touch_move_cb = {
        let shared = shared.clone();
        let last_touch_x = last_touch_x.clone();
        Closure::wrap(Box::new(move |e: TouchEvent| {
            let Some(t0) = e.touches().item(0) else {
                return;
            };
            e.prevent_default();
            let (x, y) = shared.local_point(t0.client_x(), t0.client_y());
            *last_touch_x.borrow_mut() = x;
            shared.state.borrow_mut().pointer_move(x, y);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "touchmove", touch_move_cb)?);

    let touch_end_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |e: TouchEvent| {
            if e.touches().length() > 0 || shared.state.borrow().mode.is_idle() {
                return;
            }
            let x = match e.changed_touches().item(0) {
                Some(t) => shared.local_point(t.client_x(), t.client_y()).0,
                None => *last_touch_x.borrow(),
            };
            let requests = shared.state.borrow_mut().pointer_up(x);
            dispatch(&shared.outlets, requests);
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "touchend", touch_end_cb)?);

    let touch_cancel_cb = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |_e: TouchEvent| {
            let mut state = shared.state.borrow_mut();
            state.mode = Default::default();
            state.viewport.pan_offset = 0.0;
        }) as Box<dyn FnMut(_)>)
    };
    listeners.push(Listener::attach(canvas, "touchcancel", touch_cancel_cb)?);

    log::debug!("timeline view mounted with {} listeners", listeners.len());
    Ok(Mounted {
        window,
        raf_id,
        frame,
        _listeners: listeners,
    })
}

#[function_component(TimelineView)]
pub fn timeline_view(props: &TimelineViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let state = use_mut_ref(|| {
        let mut state = RenderState::new(util::now_ms());
        if let Some(view) = props.initial_view {
            state.viewport.restore(view);
        }
        state.apply_config(&props.config);
        state
    });
    let zoom_index = use_state(|| state.borrow().viewport.zoom_index);
    let scene = use_mut_ref(|| Scene::new(Rc::new((*props.journal).clone())));
    let config = use_mut_ref(|| props.config.clone());
    let outlets = use_mut_ref(|| Outlets::new(props, zoom_index.clone()));
    *outlets.borrow_mut() = Outlets::new(props, zoom_index.clone());

    // New journal data: rebuild derived series and drop optimistic moves.
    {
        let scene = scene.clone();
        let state = state.clone();
        let journal = props.journal.clone();
        use_effect_with(props.journal.version, move |_| {
            *scene.borrow_mut() = Scene::new(Rc::new((*journal).clone()));
            state.borrow_mut().journal_changed();
            || ()
        });
    }
    // Story focus is re-resolved whenever the focus or the data changes.
    {
        let scene = scene.clone();
        let state = state.clone();
        let outlets = outlets.clone();
        use_effect_with((props.story_focus.clone(), props.journal.version), move |(focus, _)| {
            let requests = {
                let scene = scene.borrow();
                state.borrow_mut().focus_story(focus.as_deref(), &scene.journal.items)
            };
            dispatch(&outlets, requests);
            || ()
        });
    }
    {
        let config_ref = config.clone();
        let state = state.clone();
        use_effect_with(props.config.clone(), move |cfg| {
            state.borrow_mut().apply_config(cfg);
            *config_ref.borrow_mut() = cfg.clone();
            || ()
        });
    }
    // Main mount effect (listeners, frame loop)
    {
        let canvas_ref = canvas_ref.clone();
        let state = state.clone();
        let scene = scene.clone();
        let config = config.clone();
        let outlets = outlets.clone();
        use_effect_with((), move |_| {
            let mounted = canvas_ref
                .cast::<HtmlCanvasElement>()
                .ok_or(EngineError::CanvasDetached)
                .and_then(|canvas| {
                    mount(Shared {
                        canvas,
                        state,
                        scene,
                        config,
                        outlets,
                    })
                })
                .map_err(|err| log::error!("timeline view failed to mount: {err}"))
                .ok();
            move || drop(mounted)
        });
    }

    let zoom_cb = |step: i32| {
        let state = state.clone();
        let outlets = outlets.clone();
        Callback::from(move |()| {
            let requests = state.borrow_mut().zoom_by(step);
            dispatch(&outlets, requests);
        })
    };
    let today_cb = {
        let state = state.clone();
        let outlets = outlets.clone();
        Callback::from(move |()| {
            let requests = state.borrow_mut().recenter(from_ms(util::now_ms()));
            dispatch(&outlets, requests);
        })
    };

    let level = ZOOM_LEVELS[(*zoom_index).min(ZOOM_LEVELS.len() - 1)];
    html! {<div style="position:relative; width:100%; height:100%; overflow:hidden;">
        <canvas ref={canvas_ref} id="life-wave-canvas" style="display:block; width:100%; height:100%; touch-action:none;"></canvas>
        <ZoomControls
            level_label={level.label}
            can_zoom_in={*zoom_index > 0}
            can_zoom_out={*zoom_index + 1 < ZOOM_LEVELS.len()}
            on_zoom_in={zoom_cb(-1)}
            on_zoom_out={zoom_cb(1)}
            on_today={today_cb}
        />
    </div>}
}
