//! Laptop facade: detection, startup and the adapters on one link

use megaduck_hal::{Clock, SerialPort, VideoMemory};
use megaduck_link::{Link, StartupReport};

use crate::error::PeripheralError;
use crate::keyboard::Keyboard;
use crate::keycodes::Key;
use crate::model::Model;
use crate::rtc::{Rtc, RtcDateTime};

/// An attached and initialised laptop base
pub struct Laptop<'m, P, C> {
    link: Link<'m, P, C>,
    keyboard: Keyboard,
    model: Model,
    startup: StartupReport,
}

impl<'m, P: SerialPort, C: Clock> Laptop<'m, P, C> {
    /// Detect the model and bring the link up
    ///
    /// VRAM is inspected first, before startup can disturb anything.
    pub fn detect<V: VideoMemory + ?Sized>(
        mut link: Link<'m, P, C>,
        vram: &mut V,
    ) -> Result<Self, PeripheralError> {
        let model = Model::detect(vram);
        let startup = link.startup()?;
        Ok(Self {
            link,
            keyboard: Keyboard::new(),
            model,
            startup,
        })
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn startup_report(&self) -> &StartupReport {
        &self.startup
    }

    /// Poll the keyboard once and decode the result
    pub fn poll_key(&mut self) -> Result<Key, PeripheralError> {
        self.keyboard.read_key(&mut self.link)
    }

    pub fn read_clock(&mut self) -> Result<RtcDateTime, PeripheralError> {
        Rtc::get(&mut self.link)
    }

    pub fn write_clock(&mut self, dt: &RtcDateTime) -> Result<(), PeripheralError> {
        Rtc::set(&mut self.link, dt)
    }

    pub fn link_mut(&mut self) -> &mut Link<'m, P, C> {
        &mut self.link
    }

    pub fn into_link(self) -> Link<'m, P, C> {
        self.link
    }
}
