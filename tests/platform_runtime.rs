//! The runtime loop against fake platform services and a real worker on a temp dir.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use arc_launcher::app::{Overlay, ShortcutsMenu, TouchTarget};
use arc_launcher::domain::{AppRef, ItemKey, LauncherItem, WidgetId, WidgetProvider};
use arc_launcher::infrastructure::{
    AppCatalog, HomeSurface, LaunchInvoker, PlatformRuntime, PlatformServices, Shortcut, ShortcutError,
    ShortcutProvider, WidgetHost,
};
use arc_launcher::worker::{self, LauncherWorker, LoadSource, WorkerMessage, WorkerResponse};
use arc_launcher::{initialize, AppState, Config, Event};
use kurbo::{Point, Rect, Vec2};

const TIMEOUT: Duration = Duration::from_secs(5);

type CallLog = Rc<RefCell<Vec<String>>>;

fn installed() -> Vec<AppRef> {
    vec![
        AppRef::new("Mail", "com.mail"),
        AppRef::new("Camera", "com.camera"),
        AppRef::new("Notes", "com.notes"),
    ]
}

struct Catalog;

impl AppCatalog for Catalog {
    fn list_launchable_apps(&self) -> Vec<AppRef> {
        installed()
    }
}

struct Shortcuts;

impl ShortcutProvider for Shortcuts {
    fn list_shortcuts(&self, package_name: &str) -> Result<Vec<Shortcut>, ShortcutError> {
        if package_name != "com.mail" {
            return Err(ShortcutError::PermissionDenied);
        }
        Ok(vec![Shortcut {
            id: "compose".to_string(),
            package_name: package_name.to_string(),
            label: "Compose".to_string(),
        }])
    }
}

struct Launcher(CallLog);

impl LaunchInvoker for Launcher {
    fn launch_app(&mut self, package_name: &str) {
        self.0.borrow_mut().push(format!("launch {package_name}"));
    }

    fn launch_shortcut(&mut self, package_name: &str, shortcut_id: &str) {
        self.0.borrow_mut().push(format!("shortcut {package_name}/{shortcut_id}"));
    }

    fn open_settings(&mut self) {
        self.0.borrow_mut().push("settings".to_string());
    }
}

struct Widgets {
    log: CallLog,
    next_id: WidgetId,
    accept: bool,
}

impl WidgetHost for Widgets {
    fn allocate_widget_id(&mut self) -> WidgetId {
        self.next_id += 1;
        self.next_id
    }

    fn bind_widget(&mut self, widget_id: WidgetId, provider: &WidgetProvider) -> bool {
        self.log
            .borrow_mut()
            .push(format!("bind {widget_id} {}", provider.component));
        self.accept
    }

    fn delete_widget_id(&mut self, widget_id: WidgetId) {
        self.log.borrow_mut().push(format!("delete {widget_id}"));
    }
}

struct Surface(CallLog);

impl HomeSurface for Surface {
    fn set_scroll_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().push(format!("scroll {enabled}"));
    }
}

struct Harness {
    runtime: PlatformRuntime,
    state: AppState,
    log: CallLog,
    dir: tempfile::TempDir,
}

impl Harness {
    fn start(accept_widgets: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let log = CallLog::default();
        let services = PlatformServices {
            catalog: Box::new(Catalog),
            shortcuts: Box::new(Shortcuts),
            launcher: Box::new(Launcher(Rc::clone(&log))),
            widgets: Box::new(Widgets {
                log: Rc::clone(&log),
                next_id: 100,
                accept: accept_widgets,
            }),
            surface: Box::new(Surface(Rc::clone(&log))),
        };
        let worker = worker::spawn(LauncherWorker::open(config.resolved_data_dir()).unwrap()).unwrap();
        let mut runtime = PlatformRuntime::new(services, worker);
        let mut state = initialize(&config);

        let apps_loaded = runtime.apps_loaded();
        runtime.dispatch(&mut state, apps_loaded).unwrap();
        assert_eq!(runtime.wait_for_worker(&mut state, TIMEOUT).unwrap(), Some(true));
        // The synthesized first-run grid is written back.
        assert_eq!(runtime.wait_for_worker(&mut state, TIMEOUT).unwrap(), Some(false));

        let mut harness = Self {
            runtime,
            state,
            log,
            dir,
        };
        harness.lay_out();
        harness
    }

    fn dispatch(&mut self, event: Event) -> bool {
        self.runtime.dispatch(&mut self.state, event).unwrap()
    }

    fn lay_out(&mut self) {
        let keys: Vec<ItemKey> = self.state.store.items().iter().map(LauncherItem::key).collect();
        for (i, key) in keys.into_iter().enumerate() {
            let x = i as f64 * 100.0;
            self.dispatch(Event::ItemLaidOut {
                key,
                bounds: Rect::new(x, 0.0, x + 100.0, 100.0),
            });
        }
    }

    fn pointer_down(&mut self, key: ItemKey, x: f64, time_ms: u64) {
        self.dispatch(Event::PointerDown {
            target: TouchTarget::Item(key),
            position: Point::new(x, 50.0),
            time_ms,
        });
    }

    fn data_dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

fn app_key(package: &str) -> ItemKey {
    ItemKey::App(package.to_string())
}

#[test]
fn first_run_synthesizes_an_alphabetical_grid_and_saves_it() {
    let harness = Harness::start(true);
    let packages: Vec<String> = harness
        .state
        .store
        .items()
        .iter()
        .filter_map(|item| item.as_app().map(|app| app.package_name.clone()))
        .collect();
    assert_eq!(packages, vec!["com.camera", "com.mail", "com.notes"]);
    assert!(harness.data_dir().join("items.json").exists());
    harness.runtime.shutdown().unwrap();
}

#[test]
fn tap_launches_through_the_invoker() {
    let mut harness = Harness::start(true);
    harness.pointer_down(app_key("com.mail"), 150.0, 0);
    harness.dispatch(Event::PointerUp {
        position: Point::new(150.0, 50.0),
        time_ms: 60,
    });
    harness.dispatch(Event::Tick { time_ms: 400 });
    assert_eq!(harness.calls(), vec!["launch com.mail"]);
}

#[test]
fn long_press_fills_the_shortcut_menu_and_launches_a_shortcut() {
    let mut harness = Harness::start(true);
    harness.pointer_down(app_key("com.mail"), 150.0, 0);
    harness.dispatch(Event::Tick { time_ms: 500 });
    harness.dispatch(Event::PointerUp {
        position: Point::new(150.0, 50.0),
        time_ms: 600,
    });

    let Overlay::Shortcuts { menu, .. } = &harness.state.overlay else {
        panic!("expected the shortcuts menu, got {:?}", harness.state.overlay);
    };
    assert_eq!(
        menu,
        &ShortcutsMenu::Loaded(vec![Shortcut {
            id: "compose".to_string(),
            package_name: "com.mail".to_string(),
            label: "Compose".to_string(),
        }])
    );

    harness.dispatch(Event::SelectShortcut {
        package_name: "com.mail".to_string(),
        shortcut_id: "compose".to_string(),
    });
    assert_eq!(harness.calls(), vec!["shortcut com.mail/compose"]);
    assert_eq!(harness.state.overlay, Overlay::None);
}

#[test]
fn shortcut_permission_failure_becomes_menu_state() {
    let mut harness = Harness::start(true);
    harness.pointer_down(app_key("com.notes"), 250.0, 0);
    harness.dispatch(Event::Tick { time_ms: 500 });
    assert_eq!(
        harness.state.overlay,
        Overlay::Shortcuts {
            package_name: "com.notes".to_string(),
            menu: ShortcutsMenu::PermissionRequired,
        }
    );
}

#[test]
fn folder_made_by_dragging_survives_a_restart() {
    let mut harness = Harness::start(true);
    harness.pointer_down(app_key("com.camera"), 50.0, 0);
    harness.dispatch(Event::Tick { time_ms: 500 });
    harness.dispatch(Event::PointerMove {
        position: Point::new(60.0, 50.0),
        time_ms: 600,
    });
    harness.dispatch(Event::PointerMove {
        position: Point::new(150.0, 50.0),
        time_ms: 700,
    });
    harness.dispatch(Event::PointerUp {
        position: Point::new(150.0, 50.0),
        time_ms: 800,
    });
    assert_eq!(harness.calls(), vec!["scroll false", "scroll true"]);

    let saved = harness.runtime.wait_for_worker(&mut harness.state, TIMEOUT).unwrap();
    assert_eq!(saved, Some(false));
    let dir = harness.data_dir().to_path_buf();
    harness.runtime.shutdown().unwrap();

    let mut reopened = LauncherWorker::open(&dir).unwrap();
    let Some(WorkerResponse::StateLoaded { items, source, .. }) =
        reopened.handle_message(WorkerMessage::load_state(installed()))
    else {
        panic!("expected a state load");
    };
    assert_eq!(source, LoadSource::Saved);
    assert_eq!(items.len(), 2);
    let folder = items[0].as_folder().unwrap();
    let packages: Vec<&str> = folder.apps.iter().map(|app| app.package_name.as_str()).collect();
    assert_eq!(packages, vec!["com.mail", "com.camera"]);
}

fn drop_new_widget(harness: &mut Harness) {
    harness.dispatch(Event::OpenWidgetPicker);
    harness.dispatch(Event::NewWidgetDragStart {
        provider: WidgetProvider {
            component: "com.clock/.ClockWidget".to_string(),
            label: "Clock".to_string(),
            min_width_dp: 300.0,
            min_height_dp: 100.0,
        },
        bounds: Rect::new(0.0, 400.0, 300.0, 500.0),
    });
    harness.dispatch(Event::NewWidgetDrag {
        delta: Vec2::new(0.0, -350.0),
    });
    harness.dispatch(Event::NewWidgetDragEnd);
}

#[test]
fn bound_widget_joins_the_grid() {
    let mut harness = Harness::start(true);
    drop_new_widget(&mut harness);

    assert_eq!(
        harness.calls(),
        vec!["scroll false", "scroll true", "bind 101 com.clock/.ClockWidget"]
    );
    assert!(harness
        .state
        .store
        .items()
        .contains(&LauncherItem::Widget(101)));
    assert_eq!(harness.state.overlay, Overlay::None);
    assert_eq!(harness.runtime.wait_for_worker(&mut harness.state, TIMEOUT).unwrap(), Some(false));
}

#[test]
fn cancelled_widget_binding_releases_the_id() {
    let mut harness = Harness::start(false);
    drop_new_widget(&mut harness);

    assert_eq!(
        harness.calls(),
        vec![
            "scroll false",
            "scroll true",
            "bind 101 com.clock/.ClockWidget",
            "delete 101"
        ]
    );
    assert_eq!(harness.state.store.len(), 3);
}
