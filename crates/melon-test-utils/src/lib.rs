//! Testing utilities for Melon workspace
//!
//! Shared test helpers, fixtures, and fakes.

#![allow(missing_docs)]

use melon_dispatch::{
    AutomationFramework, AutomationLink, AutomationProvider, BridgeError, FrameworkResult,
    HostContext, MessageBus, ProcedureRegistry,
};
use melon_image::{AssetLoader, ImageCache, ImageResolver};
use melon_notify::{InMemoryPlatform, MelonConfig, NotificationComposer};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Encode a solid-colour PNG
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// In-memory asset loader that counts opens per asset
#[derive(Debug, Default)]
pub struct CountingAssetLoader {
    assets: HashMap<String, Vec<u8>>,
    opens: Mutex<HashMap<String, usize>>,
}

impl CountingAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.assets.insert(name.to_string(), bytes);
        self
    }

    pub fn with_png(self, name: &str, width: u32, height: u32) -> Self {
        self.with_asset(name, png_bytes(width, height, [10, 20, 30, 255]))
    }

    pub fn opens(&self, name: &str) -> usize {
        self.opens.lock().get(name).copied().unwrap_or(0)
    }
}

impl AssetLoader for CountingAssetLoader {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        *self.opens.lock().entry(name.to_string()).or_default() += 1;
        self.assets
            .get(name)
            .map(|bytes| Box::new(Cursor::new(bytes.clone())) as Box<dyn Read + Send>)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }
}

/// A recorded automation call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub screen: String,
    pub procedure: String,
    pub args: Vec<Value>,
}

#[derive(Debug)]
struct RecordingFramework {
    screen: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl AutomationFramework for RecordingFramework {
    fn call(&self, procedure: &str, args: &[Value]) -> Result<Value, BridgeError> {
        self.calls.lock().push(RecordedCall {
            screen: self.screen.clone(),
            procedure: procedure.to_string(),
            args: args.to_vec(),
        });
        Ok(Value::Bool(true))
    }

    fn close(&self) -> Result<bool, BridgeError> {
        Ok(true)
    }
}

/// Automation provider that records every call
#[derive(Debug, Default)]
pub struct RecordingProvider {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    activations: Mutex<Vec<String>>,
    refuse: bool,
}

impl RecordingProvider {
    pub const NAME: &'static str = "recording";

    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose factory reports no framework
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().clone()
    }
}

impl AutomationProvider for RecordingProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&self, _context: &HostContext, screen: &str) -> Result<FrameworkResult, BridgeError> {
        if self.refuse {
            return Ok(FrameworkResult::failed());
        }
        Ok(FrameworkResult::ok(Arc::new(RecordingFramework {
            screen: screen.to_string(),
            calls: Arc::clone(&self.calls),
        })))
    }

    fn activate(&self, _context: &HostContext, screen: &str) -> Result<(), BridgeError> {
        self.activations.lock().push(screen.to_string());
        Ok(())
    }
}

/// Register a procedure that counts its calls and records its arguments
pub fn counting_procedure(
    registry: &ProcedureRegistry,
    name: &str,
) -> (Arc<AtomicUsize>, Arc<Mutex<Vec<Vec<Value>>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (counter, record) = (Arc::clone(&calls), Arc::clone(&seen));
    registry.register(name, move |args| {
        counter.fetch_add(1, Ordering::SeqCst);
        record.lock().push(args.to_vec());
        Ok(Value::Null)
    });
    (calls, seen)
}

/// Composer over an in-memory platform and the given collaborators
pub struct ComposerFixture {
    pub composer: NotificationComposer,
    pub platform: Arc<InMemoryPlatform>,
    pub assets: Arc<CountingAssetLoader>,
}

impl ComposerFixture {
    /// Composer with no automation provider
    pub fn new(assets: CountingAssetLoader) -> Self {
        Self::build(assets, AutomationLink::unavailable())
    }

    /// Composer whose automation link points at `provider`
    pub fn with_provider(assets: CountingAssetLoader, provider: Arc<RecordingProvider>) -> Self {
        Self::build(assets, AutomationLink::with_provider(provider))
    }

    fn build(assets: CountingAssetLoader, link: AutomationLink) -> Self {
        let config = MelonConfig::default();
        let assets = Arc::new(assets);
        let platform = Arc::new(InMemoryPlatform::new());
        let resolver = ImageResolver::new(ImageCache::new(config.cache_capacity), assets.clone());
        let bus = MessageBus::new(config.relay_capacity, link, HostContext::new(config.package_name.clone()));
        let composer = NotificationComposer::new(config, resolver, Arc::new(bus), platform.clone());
        Self {
            composer,
            platform,
            assets,
        }
    }
}
