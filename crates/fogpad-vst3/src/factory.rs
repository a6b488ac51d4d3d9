//! VST3 plugin factory.
//!
//! Registers exactly one class: the audio processor. A controller UID in
//! [`Vst3Config`] is only reported back to hosts through
//! `getControllerClassId`; the controller itself ships separately.

use std::ffi::c_void;
use std::marker::PhantomData;

use com_scrape_types::MakeHeader;
use fogpad_core::PluginConfig;
use vst3::{Class, ComWrapper, Steinberg::*};

use crate::util::{copy_cstring, copy_wstring};
use crate::wrapper::Vst3Config;

const AUDIO_MODULE_CLASS: &str = "Audio Module Class";
const SDK_VERSION: &str = "VST 3.7.0";

pub struct Factory<C> {
    config: &'static PluginConfig,
    vst3_config: &'static Vst3Config,
    _marker: PhantomData<C>,
}

impl<C> Factory<C> {
    pub const fn new(config: &'static PluginConfig, vst3_config: &'static Vst3Config) -> Self {
        Self {
            config,
            vst3_config,
            _marker: PhantomData,
        }
    }
}

/// Component types the factory can instantiate.
pub trait ComponentFactory: Class {
    fn create(config: &'static PluginConfig, vst3_config: &'static Vst3Config) -> Self;
}

impl<C> Class for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    type Interfaces = (IPluginFactory3,);
}

impl<C> IPluginFactoryTrait for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    unsafe fn getFactoryInfo(&self, info: *mut PFactoryInfo) -> tresult {
        let Some(info) = info.as_mut() else {
            return kInvalidArgument;
        };

        copy_cstring(self.config.vendor, &mut info.vendor);
        copy_cstring(self.config.url, &mut info.url);
        info.email.fill(0);
        info.flags = PFactoryInfo_::FactoryFlags_::kUnicode as int32;
        kResultOk
    }

    unsafe fn countClasses(&self) -> i32 {
        1
    }

    unsafe fn getClassInfo(&self, index: i32, info: *mut PClassInfo) -> tresult {
        let Some(info) = info.as_mut() else {
            return kInvalidArgument;
        };
        if index != 0 {
            return kInvalidArgument;
        }

        info.cid = self.vst3_config.component_uid;
        info.cardinality = PClassInfo_::ClassCardinality_::kManyInstances as int32;
        copy_cstring(AUDIO_MODULE_CLASS, &mut info.category);
        copy_cstring(self.config.name, &mut info.name);
        kResultOk
    }

    unsafe fn createInstance(
        &self,
        cid: FIDString,
        iid: FIDString,
        obj: *mut *mut c_void,
    ) -> tresult {
        if cid.is_null() || iid.is_null() || obj.is_null() {
            return kInvalidArgument;
        }

        let requested_cid = &*(cid as *const TUID);
        if *requested_cid != self.vst3_config.component_uid {
            return kInvalidArgument;
        }

        let component = ComWrapper::new(C::create(self.config, self.vst3_config));
        let Some(unknown) = component.as_com_ref::<FUnknown>() else {
            return kNoInterface;
        };
        let ptr = unknown.as_ptr();
        ((*(*ptr).vtbl).queryInterface)(ptr, iid as *const TUID, obj)
    }
}

impl<C> IPluginFactory2Trait for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    unsafe fn getClassInfo2(&self, index: i32, info: *mut PClassInfo2) -> tresult {
        let Some(info) = info.as_mut() else {
            return kInvalidArgument;
        };
        if index != 0 {
            return kInvalidArgument;
        }

        info.cid = self.vst3_config.component_uid;
        info.cardinality = PClassInfo_::ClassCardinality_::kManyInstances as int32;
        copy_cstring(AUDIO_MODULE_CLASS, &mut info.category);
        copy_cstring(self.config.name, &mut info.name);
        info.classFlags = 0;
        copy_cstring(self.config.sub_categories, &mut info.subCategories);
        copy_cstring(self.config.vendor, &mut info.vendor);
        copy_cstring(self.config.version, &mut info.version);
        copy_cstring(SDK_VERSION, &mut info.sdkVersion);
        kResultOk
    }
}

impl<C> IPluginFactory3Trait for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    unsafe fn getClassInfoUnicode(&self, index: i32, info: *mut PClassInfoW) -> tresult {
        let Some(info) = info.as_mut() else {
            return kInvalidArgument;
        };
        if index != 0 {
            return kInvalidArgument;
        }

        info.cid = self.vst3_config.component_uid;
        info.cardinality = PClassInfo_::ClassCardinality_::kManyInstances as int32;
        copy_cstring(AUDIO_MODULE_CLASS, &mut info.category);
        copy_wstring(self.config.name, &mut info.name);
        info.classFlags = 0;
        copy_cstring(self.config.sub_categories, &mut info.subCategories);
        copy_wstring(self.config.vendor, &mut info.vendor);
        copy_wstring(self.config.version, &mut info.version);
        copy_wstring(SDK_VERSION, &mut info.sdkVersion);
        kResultOk
    }

    unsafe fn setHostContext(&self, _context: *mut FUnknown) -> tresult {
        kResultOk
    }
}
