// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{error::Error, fmt};

use parking_lot::Mutex;
use tokio::sync::mpsc::Sender;
use tracing::info;

/// A mock input device. Events are injected with [`Device::mock_event`].
pub struct Device {
    name: String,
    sender: Mutex<Option<Sender<Vec<u8>>>>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            sender: Mutex::new(None),
        }
    }

    /// Sends the mock event through to the watcher. Returns false if nothing
    /// is watching or the receiver is gone.
    pub fn mock_event(&self, event: &[u8]) -> bool {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.try_send(event.to_vec()).is_ok(),
            None => false,
        }
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn watch_events(&self, sender: Sender<Vec<u8>>) -> Result<(), Box<dyn Error>> {
        let mut current = self.sender.lock();
        if current.is_some() {
            return Err("Already watching events.".into());
        }
        info!(device = self.name, "Watching MIDI events (mock).");
        *current = Some(sender);
        Ok(())
    }

    fn stop_watch_events(&self) {
        self.sender.lock().take();
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::super::Device as _;
    use super::*;

    #[test]
    fn test_mock_events() {
        let device = Device::get("mock");
        assert!(!device.mock_event(&[0x90, 60, 100]));

        let (tx, mut rx) = mpsc::channel(4);
        device.watch_events(tx.clone()).unwrap();
        assert!(device.watch_events(tx).is_err());

        assert!(device.mock_event(&[0x90, 60, 100]));
        assert_eq!(rx.try_recv().unwrap(), vec![0x90, 60, 100]);

        device.stop_watch_events();
        assert!(!device.mock_event(&[0x80, 60, 0]));
    }
}
