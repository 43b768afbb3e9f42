use aws_sdk_cloudformation::error::DisplayErrorContext;
use aws_sdk_cloudformation::types::{Capability, Parameter, Stack};

use super::{Error, StackProvider, UpdateRequest};
use crate::state::{StackDescription, StackParameter};

/// [`StackProvider`] backed by AWS CloudFormation.
///
/// The SDK is asynchronous while the rest of the program is not, so the
/// client carries its own single threaded runtime and blocks on every call.
pub struct CloudFormation {
    runtime: tokio::runtime::Runtime,
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormation {
    /// Load AWS credentials from the environment. `region` overrides the
    /// region resolved by the default provider chain.
    pub fn connect(region: Option<String>) -> Result<Self, Error> {
        let runtime: tokio::runtime::Runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let sdk_config: aws_config::SdkConfig = runtime.block_on(async {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(aws_sdk_cloudformation::config::Region::new(region));
            }
            loader.load().await
        });
        log::debug!(
            "CloudFormation client configured for region {}",
            sdk_config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "<unresolved>".into())
        );

        let client = aws_sdk_cloudformation::Client::new(&sdk_config);
        return Ok(Self { runtime, client });
    }
}

fn stack_description(stack: &Stack) -> StackDescription {
    let parameters: Vec<StackParameter> = stack
        .parameters()
        .iter()
        .filter_map(|p| {
            let key: &str = p.parameter_key()?;
            Some(StackParameter::new(key, p.parameter_value().unwrap_or_default()))
        })
        .collect();
    let status: String = stack
        .stack_status()
        .map(|s| s.as_str().to_owned())
        .unwrap_or_default();
    return StackDescription { parameters, status };
}

/// Only the first stack of a description is considered.
fn first_description(stacks: &[Stack]) -> Option<StackDescription> {
    return stacks.first().map(stack_description);
}

impl StackProvider for CloudFormation {
    fn describe(&self, stack_name: &str) -> Result<Option<StackDescription>, Error> {
        let output = self
            .runtime
            .block_on(self.client.describe_stacks().stack_name(stack_name).send())
            .map_err(|err| Error::Sdk {
                operation: "DescribeStacks",
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let description: Option<StackDescription> = first_description(output.stacks());
        if let Some(ref n) = description {
            log::debug!(
                "Stack {stack_name}: status {}, {} parameters",
                n.status,
                n.parameters.len()
            );
        }
        return Ok(description);
    }

    fn update(&self, request: &UpdateRequest) -> Result<(), Error> {
        let parameters: Vec<Parameter> = request
            .parameters
            .iter()
            .map(|p| {
                Parameter::builder()
                    .parameter_key(p.key.as_str())
                    .use_previous_value(p.use_previous_value())
                    .set_parameter_value(p.value().map(str::to_owned))
                    .build()
            })
            .collect();

        let mut update = self
            .client
            .update_stack()
            .stack_name(request.stack_name.as_str())
            .use_previous_template(request.use_previous_template)
            .set_parameters(Some(parameters));
        for capability in &request.capabilities {
            update = update.capabilities(Capability::from(capability.as_str()));
        }

        let output = self
            .runtime
            .block_on(update.send())
            .map_err(|err| Error::Sdk {
                operation: "UpdateStack",
                message: DisplayErrorContext(&err).to_string(),
            })?;
        log::debug!(
            "Stack update accepted: {}",
            output.stack_id().unwrap_or("<no stack id>")
        );
        return Ok(());
    }
}
