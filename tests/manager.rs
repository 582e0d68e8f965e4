use ioc_bootstrap::{
    implements, AnyInstance, Bootstrapper, BootstrapperExt as _, Config, DefaultBootstrapper, Inject, Injectable, InstantiatorResult, Key,
    Lifetime, Manager, ManagerErrorKind, ManagerState, Module, ModuleSource, ResolveErrorKind, ScopeId, SelectionPolicy,
    ServiceDescriptor, TypeInfo,
};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicU8, AtomicUsize, Ordering},
    Arc, Barrier,
};
use tracing_test::traced_test;

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct ConsoleGreeter;

impl Greeter for ConsoleGreeter {
    fn greet(&self) -> String {
        "Hello from console".to_owned()
    }
}

implements!(ConsoleGreeter => dyn Greeter);

#[derive(Default)]
struct GreeterModule;

impl Module for GreeterModule {
    fn load(&self, bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()> {
        bootstrapper.register_factory::<dyn Greeter, _, _>(|| Ok(ConsoleGreeter), Lifetime::Singleton)?;
        Ok(())
    }
}

#[test]
#[traced_test]
fn test_greeter_end_to_end() {
    let manager = Manager::new([ModuleSource::new("app").with_module::<GreeterModule>()]).unwrap();

    let greeter_1 = manager.resolve::<dyn Greeter>().unwrap();
    let greeter_2 = manager.resolve::<dyn Greeter>().unwrap();

    assert_eq!(greeter_1.greet(), "Hello from console");
    assert!(Arc::ptr_eq(&greeter_1, &greeter_2));
    assert_eq!(manager.modules().len(), 1);
    assert_eq!(manager.state(), ManagerState::Ready);

    manager.dispose();
}

#[test]
#[traced_test]
fn test_concurrent_resolve() {
    const THREADS: usize = 16;

    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct CountingModule;

    impl Module for CountingModule {
        fn load(&self, bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()> {
            bootstrapper.register_factory::<dyn Greeter, _, _>(
                || {
                    CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                    Ok(ConsoleGreeter)
                },
                Lifetime::Singleton,
            )?;
            Ok(())
        }
    }

    let manager = Manager::new([ModuleSource::new("app").with_module::<CountingModule>()]).unwrap();
    let barrier = Barrier::new(THREADS);

    let greeters = std::thread::scope(|scope| {
        let handles = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    manager.resolve::<dyn Greeter>().unwrap()
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>()
    });

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
    assert_eq!(greeters.len(), THREADS);
    assert!(greeters.iter().all(|greeter| Arc::ptr_eq(greeter, &greeters[0])));

    manager.dispose();
}

struct Ordered {
    name: &'static str,
    order: i32,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Module for Ordered {
    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn load(&self, _bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()> {
        self.calls.lock().push(self.name);
        Ok(())
    }
}

fn ordered(source: ModuleSource, calls: &Arc<Mutex<Vec<&'static str>>>, name: &'static str, order: i32) -> ModuleSource {
    let calls = calls.clone();
    source.with_module_fn(move |_| {
        Ok(Ordered {
            name,
            order,
            calls: calls.clone(),
        })
    })
}

#[test]
#[traced_test]
fn test_module_order_across_sources() {
    let calls = Arc::new(Mutex::new(Vec::new()));

    let first = ordered(ordered(ModuleSource::new("first"), &calls, "A", 2), &calls, "B", 1);
    let second = ordered(ordered(ModuleSource::new("second"), &calls, "C", 1), &calls, "D", 3);

    let manager = Manager::new([first, second]).unwrap();

    assert_eq!(*calls.lock(), ["B", "C", "A", "D"]);
    assert_eq!(manager.modules(), ["B", "C", "A", "D"]);

    manager.dispose();
}

static RESOLVED: AtomicUsize = AtomicUsize::new(0);

/// Bootstrapper that counts resolutions and delegates everything to the default one.
struct CountingBootstrapper {
    inner: DefaultBootstrapper,
}

impl Bootstrapper for CountingBootstrapper {
    fn create(sources: &[ModuleSource]) -> anyhow::Result<Self> {
        Ok(Self {
            inner: DefaultBootstrapper::create(sources)?,
        })
    }

    fn name(&self) -> &str {
        "CountingBootstrapper"
    }

    fn register_descriptor(&self, descriptor: ServiceDescriptor) -> Result<(), ResolveErrorKind> {
        self.inner.register_descriptor(descriptor)
    }

    fn register_all_erased(&self, contract: TypeInfo) -> Result<usize, ResolveErrorKind> {
        self.inner.register_all_erased(contract)
    }

    fn resolve_erased(&self, key: &Key, scope: Option<ScopeId>) -> Result<AnyInstance, ResolveErrorKind> {
        RESOLVED.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_erased(key, scope)
    }

    fn resolve_all_erased(&self, contract: TypeInfo, scope: Option<ScopeId>) -> Result<Vec<AnyInstance>, ResolveErrorKind> {
        self.inner.resolve_all_erased(contract, scope)
    }

    fn begin_scope(&self) -> Result<ScopeId, ResolveErrorKind> {
        self.inner.begin_scope()
    }

    fn end_scope(&self, scope: ScopeId) {
        self.inner.end_scope(scope);
    }

    fn dispose(&self) {
        self.inner.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

#[test]
#[traced_test]
fn test_exported_bootstrapper_selected() {
    let sources = [
        ModuleSource::new("app").with_module::<GreeterModule>(),
        ModuleSource::new("infra").with_bootstrapper::<CountingBootstrapper>(),
    ];

    let manager = Manager::new(sources).unwrap();
    assert_eq!(manager.to_string(), "CountingBootstrapper");

    manager.resolve::<dyn Greeter>().unwrap();
    manager.resolve::<dyn Greeter>().unwrap();
    assert_eq!(RESOLVED.load(Ordering::SeqCst), 2);

    manager.dispose();
    assert!(manager.bootstrapper().is_disposed());
}

#[test]
#[traced_test]
fn test_builtin_source_never_selected() {
    let manager = Manager::builder()
        .source(ModuleSource::builtin())
        .source(ModuleSource::new("app").with_module::<GreeterModule>())
        .config(Config {
            selection: SelectionPolicy::ByTypeName,
            ..Config::default()
        })
        .build()
        .unwrap();

    assert_eq!(manager.name(), "DefaultBootstrapper");
    assert_eq!(manager.sources().len(), 2);

    manager.dispose();
}

trait Handler: Send + Sync {
    fn handle(&self) -> u8;
}

struct Ping;
struct Pong;

impl Handler for Ping {
    fn handle(&self) -> u8 {
        1
    }
}

impl Handler for Pong {
    fn handle(&self) -> u8 {
        2
    }
}

implements!(Ping => dyn Handler);
implements!(Pong => dyn Handler);

#[derive(Default)]
struct HandlersModule;

impl Module for HandlersModule {
    fn order(&self) -> i32 {
        10
    }

    fn load(&self, bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()> {
        let count = bootstrapper.register_all::<dyn Handler>()?;
        anyhow::ensure!(count == 2, "expected 2 handlers, got {count}");
        Ok(())
    }
}

#[test]
#[traced_test]
fn test_register_all_exports() {
    let manager = Manager::new([
        ModuleSource::new("handlers")
            .with_service(ServiceDescriptor::instance::<dyn Handler, _>(Ping, Lifetime::Singleton))
            .with_service(ServiceDescriptor::factory::<dyn Handler, _, _>(|| Ok(Pong), Lifetime::Transient)),
        ModuleSource::new("app").with_module::<HandlersModule>(),
    ])
    .unwrap();

    let handled = manager
        .resolve_all::<dyn Handler>()
        .unwrap()
        .iter()
        .map(|handler| handler.handle())
        .collect::<Vec<_>>();
    assert_eq!(handled, [1, 2]);

    manager.dispose();
}

struct RequestId(u8);

struct RequestContext {
    id: Arc<RequestId>,
}

impl Injectable for RequestContext {
    type Deps = (Inject<RequestId>,);

    fn inject((Inject(id),): Self::Deps) -> InstantiatorResult<Self> {
        Ok(Self { id })
    }
}

#[test]
#[traced_test]
fn test_scoped_requests() {
    let next_id = Arc::new(AtomicU8::new(0));
    let released = Arc::new(Mutex::new(Vec::new()));

    let manager = Manager::new([ModuleSource::new("web").with_module_fn({
        let next_id = next_id.clone();
        let released = released.clone();
        move |_: &dyn Bootstrapper| {
            Ok(RequestsModule {
                next_id: next_id.clone(),
                released: released.clone(),
            })
        }
    })])
    .unwrap();

    {
        let scope = manager.scope().unwrap();
        let context_1 = scope.resolve::<RequestContext>().unwrap();
        let context_2 = scope.resolve::<RequestContext>().unwrap();
        assert!(Arc::ptr_eq(&context_1.id, &context_2.id));
        assert_eq!(context_1.id.0, 1);
    }
    assert_eq!(*released.lock(), [1]);

    {
        let scope = manager.scope().unwrap();
        assert_eq!(scope.resolve::<RequestContext>().unwrap().id.0, 2);
        scope.close();
    }
    assert_eq!(*released.lock(), [1, 2]);

    let Err(err) = manager.resolve::<RequestContext>() else {
        panic!("expected no scope error");
    };
    assert!(matches!(err.root(), ResolveErrorKind::NoScope { .. }));

    manager.dispose();
    assert_eq!(released.lock().len(), 2);
}

struct RequestsModule {
    next_id: Arc<AtomicU8>,
    released: Arc<Mutex<Vec<u8>>>,
}

impl Module for RequestsModule {
    fn load(&self, bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()> {
        let next_id = self.next_id.clone();
        let released = self.released.clone();

        bootstrapper.register_descriptor(
            ServiceDescriptor::factory::<RequestId, _, _>(move || Ok(RequestId(next_id.fetch_add(1, Ordering::SeqCst) + 1)), Lifetime::Scoped)
                .with_finalizer(move |id: Arc<RequestId>| {
                    released.lock().push(id.0);
                    Ok(())
                }),
        )?;
        bootstrapper.register::<RequestContext, RequestContext>(Lifetime::Transient)?;
        Ok(())
    }
}

#[test]
#[traced_test]
fn test_module_load_failure() {
    struct MisconfiguredModule;

    impl Module for MisconfiguredModule {
        fn load(&self, bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()> {
            bootstrapper.resolve::<dyn Greeter>()?;
            Ok(())
        }
    }

    let result = Manager::new([
        ModuleSource::new("app").with_module::<GreeterModule>(),
        ModuleSource::new("broken").with_module_fn(|_| Ok(MisconfiguredModule)),
    ]);
    result.unwrap().dispose();

    let result = Manager::new([ModuleSource::new("broken").with_module_fn(|_| Ok(MisconfiguredModule))]);
    match result {
        Err(ManagerErrorKind::ModuleLoad { source, .. }) => {
            let err = source.downcast_ref::<ResolveErrorKind>().unwrap();
            assert!(err.is_unresolved());
        }
        _ => panic!("expected module load error"),
    }
}
