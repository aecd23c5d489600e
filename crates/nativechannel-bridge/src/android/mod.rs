// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android host via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Device identity comes from `android.os.Build`,
// the battery from `BatteryManager` with the sticky `ACTION_BATTERY_CHANGED`
// intent as fallback, and the map credential from the application's
// `<meta-data>` bundle.
//
// ## Kotlin glue
//
// `MainActivity` declares the natives on a `NativeBridge` object and calls
// `nativeOnCreate(this)` from `configureFlutterEngine`, `nativeDispatch` from
// its `MethodChannel` handler and `nativeOnNewIntent` from `onNewIntent`. It
// also exposes `handleDeepLink(url: String)` (forwards to the app-links
// plugin) and is the object every query below is made against.

#![cfg(target_os = "android")]

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jstring};
use jni::{JNIEnv, JavaVM};

use nativechannel_core::error::{BridgeError, Result};
use nativechannel_core::{BatteryLevel, BridgeConfig, CHANNEL_NAME, Platform};

use crate::battery::{BatterySnapshot, resolve_capacity};
use crate::deeplink::LaunchContext;
use crate::lifecycle::AppLifecycle;
use crate::traits::*;
use crate::{logging, runtime};

/// `BatteryManager.BATTERY_PROPERTY_CAPACITY`.
const BATTERY_PROPERTY_CAPACITY: i32 = 4;
/// `PackageManager.GET_META_DATA`.
const GET_META_DATA: i32 = 0x80;
/// `Context.BATTERY_SERVICE`.
const BATTERY_SERVICE: &str = "batterymanager";
const ACTION_BATTERY_CHANGED: &str = "android.intent.action.BATTERY_CHANGED";

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Convenience: map any `jni::errors::Error` into `BridgeError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> BridgeError {
    BridgeError::Bridge(format!("{context}: {e}"))
}

/// The VM plus a global reference to the hosting activity.
pub struct JniContext {
    vm: JavaVM,
    activity: GlobalRef,
}

impl JniContext {
    /// Capture the VM and pin `activity` from inside a JNI call.
    pub fn from_env(env: &JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self> {
        let vm = env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?;
        let activity = env
            .new_global_ref(activity)
            .map_err(|e| jni_err("new_global_ref(activity)", e))?;
        Ok(Self { vm, activity })
    }

    /// Run `f` on an attached env. A Java exception left pending by a failed
    /// call is cleared before returning.
    fn with_env<T>(&self, f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>) -> Result<T> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| jni_err("attach_current_thread", e))?;
        let result = f(&mut *env, self.activity.as_obj());
        if result.is_err() && env.exception_check().unwrap_or(false) {
            let _ = env.exception_clear();
        }
        result
    }
}

/// The activity currently hosting the engine.
///
/// Android can create a new `MainActivity` in a process that is still alive
/// (back out, then open a link). Every `nativeOnCreate` rebinds to the new
/// activity so nothing keeps calling into, or pinning, the destroyed one.
pub struct ActivityBinding {
    current: RwLock<Arc<JniContext>>,
}

impl ActivityBinding {
    pub fn new(jni: JniContext) -> Self {
        Self {
            current: RwLock::new(Arc::new(jni)),
        }
    }

    /// Point every collaborator at `jni`; the previous activity's global
    /// reference is released once no call is using it.
    pub fn rebind(&self, jni: JniContext) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(jni);
    }

    /// Run `f` against the current activity. The binding lock is not held
    /// while `f` runs.
    fn with_env<T>(&self, f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>) -> Result<T> {
        let jni = Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner));
        jni.with_env(f)
    }
}

static BINDING: OnceLock<Arc<ActivityBinding>> = OnceLock::new();

/// Read a `java.lang.String` object; a null reference is `None`.
fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let value: String = env
        .get_string(&JString::from(obj))
        .map_err(|e| jni_err("get_string", e))?
        .into();
    Ok(Some(value))
}

fn static_string(env: &mut JNIEnv<'_>, class: &str, field: &str) -> Result<Option<String>> {
    let value = env
        .get_static_field(class, field, "Ljava/lang/String;")
        .map_err(|e| jni_err(field, e))?
        .l()
        .map_err(|e| jni_err(field, e))?;
    java_string(env, value)
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Android implementation of the channel host.
pub struct AndroidHost {
    jni: Arc<ActivityBinding>,
}

impl AndroidHost {
    /// Host answering queries against whichever activity `jni` is bound to.
    pub fn new(jni: Arc<ActivityBinding>) -> Self {
        Self { jni }
    }

    /// Read a static `String` field of an `android.os` class; unreadable
    /// fields are `None`.
    fn query_string(&self, class: &'static str, field: &'static str) -> Option<String> {
        self.jni
            .with_env(|env, _| static_string(env, class, field))
            .unwrap_or_else(|e| {
                tracing::debug!(field, error = %e, "Android: device field unavailable");
                None
            })
    }

    /// URL the bound activity was launched with
    /// (`getIntent().getDataString()`). An unreadable intent has no URL.
    pub fn launch_context(&self) -> LaunchContext {
        let url = self
            .jni
            .with_env(|env, activity| {
                let intent = env
                    .call_method(activity, "getIntent", "()Landroid/content/Intent;", &[])
                    .map_err(|e| jni_err("getIntent", e))?
                    .l()
                    .map_err(|e| jni_err("getIntent->l", e))?;
                if intent.is_null() {
                    return Ok(None);
                }
                let data = env
                    .call_method(&intent, "getDataString", "()Ljava/lang/String;", &[])
                    .map_err(|e| jni_err("getDataString", e))?
                    .l()
                    .map_err(|e| jni_err("getDataString->l", e))?;
                java_string(env, data)
            })
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Android: launch intent unreadable");
                None
            });
        LaunchContext {
            url,
            user_activity: None,
        }
    }
}

/// Always `Platform::Android`.
impl PlatformHost for AndroidHost {
    fn platform(&self) -> Platform {
        Platform::Android
    }
}

/// `Build.VERSION.RELEASE`, `Build.MANUFACTURER` and `Build.MODEL`.
impl NativeDeviceInfo for AndroidHost {
    fn os_version(&self) -> Option<String> {
        self.query_string("android/os/Build$VERSION", "RELEASE")
    }

    fn manufacturer(&self) -> Option<String> {
        self.query_string("android/os/Build", "MANUFACTURER")
    }

    fn model(&self) -> Option<String> {
        self.query_string("android/os/Build", "MODEL")
    }
}

// ---------------------------------------------------------------------------
// NativeBattery: BatteryManager, then ACTION_BATTERY_CHANGED
// ---------------------------------------------------------------------------

fn battery_capacity(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<Option<i32>> {
    let j_service: JString = env
        .new_string(BATTERY_SERVICE)
        .map_err(|e| jni_err("new_string(BATTERY_SERVICE)", e))?;
    let manager = env
        .call_method(
            activity,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&j_service)],
        )
        .map_err(|e| jni_err("getSystemService", e))?
        .l()
        .map_err(|e| jni_err("getSystemService->l", e))?;
    if manager.is_null() {
        return Ok(None);
    }
    let level = env
        .call_method(
            &manager,
            "getIntProperty",
            "(I)I",
            &[JValue::Int(BATTERY_PROPERTY_CAPACITY)],
        )
        .map_err(|e| jni_err("getIntProperty", e))?
        .i()
        .map_err(|e| jni_err("getIntProperty->i", e))?;
    Ok(Some(level))
}

fn int_extra(env: &mut JNIEnv<'_>, intent: &JObject<'_>, key: &str) -> Result<i32> {
    let j_key: JString = env
        .new_string(key)
        .map_err(|e| jni_err("new_string(extra)", e))?;
    env.call_method(
        intent,
        "getIntExtra",
        "(Ljava/lang/String;I)I",
        &[JValue::Object(&j_key), JValue::Int(-1)],
    )
    .map_err(|e| jni_err("getIntExtra", e))?
    .i()
    .map_err(|e| jni_err("getIntExtra->i", e))
}

fn battery_snapshot(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<Option<BatterySnapshot>> {
    let j_action: JString = env
        .new_string(ACTION_BATTERY_CHANGED)
        .map_err(|e| jni_err("new_string(ACTION_BATTERY_CHANGED)", e))?;
    let filter = env
        .new_object(
            "android/content/IntentFilter",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_action)],
        )
        .map_err(|e| jni_err("new IntentFilter", e))?;

    // registerReceiver(null, filter) returns the sticky intent without
    // registering anything.
    let no_receiver = JObject::null();
    let intent = env
        .call_method(
            activity,
            "registerReceiver",
            "(Landroid/content/BroadcastReceiver;Landroid/content/IntentFilter;)Landroid/content/Intent;",
            &[JValue::Object(&no_receiver), JValue::Object(&filter)],
        )
        .map_err(|e| jni_err("registerReceiver", e))?
        .l()
        .map_err(|e| jni_err("registerReceiver->l", e))?;
    if intent.is_null() {
        return Ok(None);
    }

    Ok(Some(BatterySnapshot {
        raw_level: int_extra(env, &intent, "level")?,
        scale: int_extra(env, &intent, "scale")?,
    }))
}

/// Capacity property first; the sticky broadcast is read only when the
/// property is missing or negative.
impl NativeBattery for AndroidHost {
    fn battery_level(&self) -> BatteryLevel {
        let primary = self.jni.with_env(battery_capacity).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Android: BatteryManager unavailable");
            None
        });
        resolve_capacity(primary, || {
            self.jni.with_env(battery_snapshot).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Android: battery-changed intent unavailable");
                None
            })
        })
    }
}

// ---------------------------------------------------------------------------
// NativeManifest: ApplicationInfo.metaData
// ---------------------------------------------------------------------------

fn metadata_string(env: &mut JNIEnv<'_>, activity: &JObject<'_>, key: &str) -> Result<Option<String>> {
    let meta_err = |context: &str, e: jni::errors::Error| BridgeError::Metadata(format!("{context}: {e}"));

    let package_manager = env
        .call_method(
            activity,
            "getPackageManager",
            "()Landroid/content/pm/PackageManager;",
            &[],
        )
        .map_err(|e| meta_err("getPackageManager", e))?
        .l()
        .map_err(|e| meta_err("getPackageManager->l", e))?;
    let package_name = env
        .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])
        .map_err(|e| meta_err("getPackageName", e))?
        .l()
        .map_err(|e| meta_err("getPackageName->l", e))?;
    let app_info = env
        .call_method(
            &package_manager,
            "getApplicationInfo",
            "(Ljava/lang/String;I)Landroid/content/pm/ApplicationInfo;",
            &[JValue::Object(&package_name), JValue::Int(GET_META_DATA)],
        )
        .map_err(|e| meta_err("getApplicationInfo", e))?
        .l()
        .map_err(|e| meta_err("getApplicationInfo->l", e))?;
    let bundle = env
        .get_field(&app_info, "metaData", "Landroid/os/Bundle;")
        .map_err(|e| meta_err("metaData", e))?
        .l()
        .map_err(|e| meta_err("metaData->l", e))?;
    if bundle.is_null() {
        return Ok(None);
    }

    let j_key: JString = env
        .new_string(key)
        .map_err(|e| meta_err("new_string(key)", e))?;
    let value = env
        .call_method(
            &bundle,
            "getString",
            "(Ljava/lang/String;)Ljava/lang/String;",
            &[JValue::Object(&j_key)],
        )
        .map_err(|e| meta_err("Bundle.getString", e))?
        .l()
        .map_err(|e| meta_err("Bundle.getString->l", e))?;
    java_string(env, value)
}

/// `<meta-data>` entries of the application manifest.
impl NativeManifest for AndroidHost {
    fn manifest_string(&self, key: &str) -> Result<Option<String>> {
        self.jni
            .with_env(|env, activity| metadata_string(env, activity, key))
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// `com.google.firebase.FirebaseApp`, driven through JNI.
pub struct FirebaseAnalytics {
    jni: Arc<ActivityBinding>,
}

impl FirebaseAnalytics {
    pub fn new(jni: Arc<ActivityBinding>) -> Self {
        Self { jni }
    }
}

/// Configured means `FirebaseApp.getApps(context)` is non-empty; configuring
/// calls `FirebaseApp.initializeApp(context)`. Failures are logged, never
/// raised.
impl AnalyticsSdk for FirebaseAnalytics {
    fn is_configured(&self) -> bool {
        self.jni
            .with_env(|env, activity| {
                let apps = env
                    .call_static_method(
                        "com/google/firebase/FirebaseApp",
                        "getApps",
                        "(Landroid/content/Context;)Ljava/util/List;",
                        &[JValue::Object(activity)],
                    )
                    .map_err(|e| jni_err("FirebaseApp.getApps", e))?
                    .l()
                    .map_err(|e| jni_err("getApps->l", e))?;
                let empty = env
                    .call_method(&apps, "isEmpty", "()Z", &[])
                    .map_err(|e| jni_err("List.isEmpty", e))?
                    .z()
                    .map_err(|e| jni_err("isEmpty->z", e))?;
                Ok(!empty)
            })
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Android: Firebase registry unreadable");
                false
            })
    }

    fn configure(&self) {
        let result = self.jni.with_env(|env, activity| {
            env.call_static_method(
                "com/google/firebase/FirebaseApp",
                "initializeApp",
                "(Landroid/content/Context;)Lcom/google/firebase/FirebaseApp;",
                &[JValue::Object(activity)],
            )
            .map_err(|e| jni_err("FirebaseApp.initializeApp", e))?;
            Ok(())
        });
        if let Err(e) = result {
            tracing::warn!(error = %e, "Android: Firebase configuration failed");
        }
    }
}

/// Forwards links to the activity's `handleDeepLink(String)`.
pub struct ActivityLinkHandler {
    jni: Arc<ActivityBinding>,
}

impl ActivityLinkHandler {
    pub fn new(jni: Arc<ActivityBinding>) -> Self {
        Self { jni }
    }
}

/// Delivery is synchronous on the calling thread; a failed call is logged and
/// the link is not retried.
impl LinkHandler for ActivityLinkHandler {
    fn handle_link(&self, url: &str) {
        let result = self.jni.with_env(|env, activity| {
            let j_url: JString = env
                .new_string(url)
                .map_err(|e| jni_err("new_string(url)", e))?;
            env.call_method(
                activity,
                "handleDeepLink",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&j_url)],
            )
            .map_err(|e| jni_err("handleDeepLink", e))?;
            Ok(())
        });
        if let Err(e) = result {
            tracing::warn!(error = %e, "Android: deep link not delivered");
        }
    }
}

// ---------------------------------------------------------------------------
// JNI exports: com.example.flutter_bloc_app.NativeBridge
// ---------------------------------------------------------------------------

fn read_jstring(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Option<String> {
    if value.is_null() {
        return None;
    }
    env.get_string(value).ok().map(Into::into)
}

/// Bind the bridge to `activity`, install the process lifecycle on first
/// call, configure the SDK, forward the launch intent and register the
/// channel. Called again when the activity is recreated in a live process.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_flutter_1bloc_1app_NativeBridge_nativeOnCreate<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    activity: JObject<'local>,
) -> jboolean {
    let config = BridgeConfig::android();
    logging::init_logging(&config.log_filter);

    let jni = match JniContext::from_env(&env, &activity) {
        Ok(jni) => jni,
        Err(e) => {
            tracing::error!(error = %e, "Android: bridge bootstrap failed");
            return JNI_FALSE;
        }
    };
    let binding = match BINDING.get() {
        Some(binding) => {
            tracing::info!("Android: activity recreated, rebinding bridge");
            binding.rebind(jni);
            Arc::clone(binding)
        }
        None => Arc::clone(BINDING.get_or_init(|| Arc::new(ActivityBinding::new(jni)))),
    };
    let host = Arc::new(AndroidHost::new(Arc::clone(&binding)));
    let launch = host.launch_context();

    let lifecycle = runtime::install(AppLifecycle::new(
        config,
        host,
        Arc::new(ActivityLinkHandler::new(Arc::clone(&binding))),
        Arc::new(FirebaseAnalytics::new(binding)),
    ));
    lifecycle.did_finish_launching(&launch, &mut runtime::ProcessEngine);
    JNI_TRUE
}

/// Engine (re)creation; registers the channel on the process engine.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_flutter_1bloc_1app_NativeBridge_nativeConfigureEngine<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    match runtime::lifecycle() {
        Some(lifecycle) => lifecycle.engine_created(&mut runtime::ProcessEngine),
        None => tracing::warn!("Android: engine configured before nativeOnCreate"),
    }
}

/// Answer one method call; returns the JSON reply envelope.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_flutter_1bloc_1app_NativeBridge_nativeDispatch<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    method: JString<'local>,
    arguments_json: JString<'local>,
) -> jstring {
    let method = read_jstring(&mut env, &method).unwrap_or_default();
    let arguments = read_jstring(&mut env, &arguments_json);
    let reply = runtime::dispatch_json(CHANNEL_NAME, &method, arguments.as_deref());
    match env.new_string(reply) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!(error = %e, "Android: failed to allocate reply string");
            std::ptr::null_mut()
        }
    }
}

/// `onNewIntent` with a data URL.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_flutter_1bloc_1app_NativeBridge_nativeOnNewIntent<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    url: JString<'local>,
) {
    let Some(url) = read_jstring(&mut env, &url) else {
        return;
    };
    match runtime::lifecycle() {
        Some(lifecycle) => lifecycle.open_url(&url),
        None => tracing::warn!("Android: deep link before nativeOnCreate, dropped"),
    }
}
