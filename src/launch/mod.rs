//! Launch arguments of the stack template, and the parameter list sent along
//! with every stack update.

use crate::constants::PARAMETER_SERVER_STATE;

/// How a single template parameter is supplied on update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LaunchArgument {
    /// Reuse whatever the stack was last updated with.
    #[default]
    UsePreviousValue,
    Value(String),
}

impl From<Option<String>> for LaunchArgument {
    fn from(value: Option<String>) -> Self {
        return match value {
            Some(n) => Self::Value(n),
            None => Self::UsePreviousValue,
        };
    }
}

/// The closed set of template parameters re-supplied on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKey {
    EnableRcon,
    FactorioImageTag,
    HostedZoneId,
    RecordName,
    KeyPairName,
    YourIp,
}

impl ArgumentKey {
    /// Every key, in the order the parameters are sent.
    pub const ALL: [ArgumentKey; 6] = [
        ArgumentKey::EnableRcon,
        ArgumentKey::FactorioImageTag,
        ArgumentKey::HostedZoneId,
        ArgumentKey::RecordName,
        ArgumentKey::KeyPairName,
        ArgumentKey::YourIp,
    ];

    /// Name of the parameter in the CloudFormation template.
    pub fn parameter_key(&self) -> &'static str {
        return match self {
            ArgumentKey::EnableRcon => "EnableRcon",
            ArgumentKey::FactorioImageTag => "FactorioImageTag",
            ArgumentKey::HostedZoneId => "HostedZoneId",
            ArgumentKey::RecordName => "RecordName",
            ArgumentKey::KeyPairName => "KeyPairName",
            ArgumentKey::YourIp => "YourIp",
        };
    }
}

impl std::fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.write_str(self.parameter_key());
    }
}

/// One argument for every [`ArgumentKey`]. Being a plain struct, a value of
/// this type can never be missing a key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchArguments {
    pub enable_rcon: LaunchArgument,
    pub factorio_image_tag: LaunchArgument,
    pub hosted_zone_id: LaunchArgument,
    pub record_name: LaunchArgument,
    pub key_pair_name: LaunchArgument,
    pub your_ip: LaunchArgument,
}

impl LaunchArguments {
    pub fn get(&self, key: ArgumentKey) -> &LaunchArgument {
        return match key {
            ArgumentKey::EnableRcon => &self.enable_rcon,
            ArgumentKey::FactorioImageTag => &self.factorio_image_tag,
            ArgumentKey::HostedZoneId => &self.hosted_zone_id,
            ArgumentKey::RecordName => &self.record_name,
            ArgumentKey::KeyPairName => &self.key_pair_name,
            ArgumentKey::YourIp => &self.your_ip,
        };
    }

    fn get_mut(&mut self, key: ArgumentKey) -> &mut LaunchArgument {
        return match key {
            ArgumentKey::EnableRcon => &mut self.enable_rcon,
            ArgumentKey::FactorioImageTag => &mut self.factorio_image_tag,
            ArgumentKey::HostedZoneId => &mut self.hosted_zone_id,
            ArgumentKey::RecordName => &mut self.record_name,
            ArgumentKey::KeyPairName => &mut self.key_pair_name,
            ArgumentKey::YourIp => &mut self.your_ip,
        };
    }

    /// Override a single argument.
    pub fn with(mut self, key: ArgumentKey, argument: LaunchArgument) -> Self {
        *self.get_mut(key) = argument;
        return self;
    }

    /// Apply a sparse set of overrides on top of the defaults. Keys not
    /// overridden keep their previous value.
    pub fn merge<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (ArgumentKey, LaunchArgument)>,
    {
        let mut merged: Self = Self::default();
        for (key, argument) in overrides {
            *merged.get_mut(key) = argument;
        }
        return merged;
    }

    /// Iterate the arguments in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (ArgumentKey, &LaunchArgument)> + '_ {
        return ArgumentKey::ALL.into_iter().map(move |key| (key, self.get(key)));
    }
}

/// Desired state written to the `ServerState` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Running,
    Stopped,
}

impl TargetState {
    pub fn as_str(&self) -> &'static str {
        return match self {
            TargetState::Running => "Running",
            TargetState::Stopped => "Stopped",
        };
    }
}

/// One entry of the parameter list of an update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterUpdate {
    pub key: String,
    pub argument: LaunchArgument,
}

impl ParameterUpdate {
    pub fn use_previous_value(&self) -> bool {
        return matches!(self.argument, LaunchArgument::UsePreviousValue);
    }

    pub fn value(&self) -> Option<&str> {
        return match &self.argument {
            LaunchArgument::Value(n) => Some(n),
            LaunchArgument::UsePreviousValue => None,
        };
    }
}

/// Build the parameter list of an update that switches the server to `target`
/// while re-supplying every launch argument.
///
/// ```rust
/// use factorioctl::launch::{build_parameters, LaunchArguments, TargetState};
///
/// let parameters = build_parameters(&LaunchArguments::default(), TargetState::Running);
/// assert_eq!(parameters[0].key, "ServerState");
/// assert_eq!(parameters[0].value(), Some("Running"));
/// assert!(parameters[1..].iter().all(|p| p.use_previous_value()));
/// ```
pub fn build_parameters(arguments: &LaunchArguments, target: TargetState) -> Vec<ParameterUpdate> {
    let mut parameters: Vec<ParameterUpdate> = Vec::with_capacity(ArgumentKey::ALL.len() + 1);
    parameters.push(ParameterUpdate {
        key: PARAMETER_SERVER_STATE.into(),
        argument: LaunchArgument::Value(target.as_str().into()),
    });
    for (key, argument) in arguments.iter() {
        parameters.push(ParameterUpdate {
            key: key.parameter_key().into(),
            argument: argument.clone(),
        });
    }
    return parameters;
}
