use super::Runtime;
use crate::control::Envelope;
use crate::{CommandReply, HostCommand};

impl Runtime {
    /// Applies every command queued through a [`crate::HostHandle`].
    pub fn pump_host_commands(&mut self) {
        while let Some(Envelope { command, reply }) = self.control.try_next() {
            let answer = self.apply_host_command(command);
            if let Some(reply) = reply {
                // The host may have stopped waiting; that is not our problem.
                let _ = reply.send(answer);
            }
        }
    }

    pub fn apply_host_command(&mut self, command: HostCommand) -> CommandReply {
        match command {
            HostCommand::InitializeSession(options) => {
                CommandReply::Bool(self.initialize_session(options).is_ok())
            }
            HostCommand::AddCelestialBody(desc) => {
                CommandReply::Node(self.scene.add_celestial_body(desc))
            }
            HostCommand::AddAxisLine(desc) => CommandReply::Node(self.scene.add_axis_line(desc)),
            HostCommand::AddGuideLine(desc) => CommandReply::Node(self.scene.add_guide_line(desc)),
            HostCommand::AddOrbitalPath(desc) => {
                CommandReply::Node(self.scene.add_orbital_path(desc))
            }
            HostCommand::AddConstellationLine {
                name,
                points,
                color,
                width,
            } => CommandReply::Node(self.scene.add_constellation_line(name, points, color, width)),
            HostCommand::AddGuideCircle(desc) => {
                CommandReply::Node(self.scene.add_guide_circle(desc))
            }
            HostCommand::AddTextLabel(desc) => CommandReply::Node(self.scene.add_text_label(desc)),
            HostCommand::UpdateNodePosition { id, position } => {
                CommandReply::Bool(self.scene.update_node_position(id, position))
            }
            HostCommand::RemoveNode(id) => CommandReply::Bool(self.scene.remove_node(id)),
            HostCommand::ClearAllNodes => {
                self.scene.clear_all_nodes();
                CommandReply::Done
            }
            HostCommand::PauseSession => {
                self.pause();
                CommandReply::Done
            }
            HostCommand::ResumeSession => CommandReply::Bool(self.resume().is_ok()),
            HostCommand::SetNightMode { enabled, intensity } => {
                self.set_night_mode(enabled, intensity);
                CommandReply::Done
            }
            HostCommand::Tap {
                x,
                y,
                timestamp_ms,
            } => {
                self.handle_tap(x, y, timestamp_ms);
                CommandReply::Done
            }
        }
    }
}
