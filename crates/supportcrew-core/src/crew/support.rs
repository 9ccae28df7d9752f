//! The customer-support crew: a representative drafts an answer using the
//! product docs, then a quality-assurance specialist reviews and finalises it.

use crate::crew::context::PipelineContext;
use crate::crew::role::{define_role, AgentRole};
use crate::crew::runner::Crew;
use crate::crew::task::TaskSpec;
use crate::error::Result;
use crate::tools::SharedTool;

pub const SUPPORT_AGENT: &str = "Senior Support Representative";
pub const QA_AGENT: &str = "Support Quality Assurance Specialist";

pub const INQUIRY_RESOLUTION: &str = "inquiry_resolution";
pub const QUALITY_ASSURANCE_REVIEW: &str = "quality_assurance_review";

pub fn support_agent() -> Result<AgentRole> {
    define_role(
        SUPPORT_AGENT,
        "Be the most friendly and helpful support representative in your team",
        "You work at crewAI (https://crewai.com) and are now working on providing \
         support to {customer}, a super important customer for your company. \
         You need to make sure that you provide the best support! \
         Make sure to provide full complete answers, and make no assumptions.",
        false,
    )
}

pub fn quality_assurance_agent() -> Result<AgentRole> {
    define_role(
        QA_AGENT,
        "Get recognition for providing the best support quality assurance in your team",
        "You work at crewAI (https://crewai.com) and are now working with your team \
         on a request from {customer} ensuring that the support representative is \
         providing the best support possible.\n\
         You need to make sure that the support representative is providing full \
         complete answers, and make no assumptions.",
        true,
    )
}

pub fn support_roles() -> Result<Vec<AgentRole>> {
    Ok(vec![support_agent()?, quality_assurance_agent()?])
}

/// Resolution task (with `tools`) followed by the review task that consumes its draft.
pub fn support_tasks(tools: Vec<SharedTool>) -> Vec<TaskSpec> {
    let inquiry_resolution = TaskSpec::new(
        INQUIRY_RESOLUTION,
        "{customer} just reached out with a super important ask:\n\
         {inquiry}\n\n\
         {person} from {customer} is the one that reached out. \
         Make sure to use everything you know to provide the best support possible. \
         You must strive to provide a complete and accurate response to the customer's inquiry.",
        "A detailed, informative response to the customer's inquiry that addresses \
         all aspects of their question.\n\
         The response should include references to everything you used to find the answer, \
         including external data or solutions. Ensure the answer is complete, \
         leaving no questions unanswered, and maintain a helpful and friendly \
         tone throughout.",
        SUPPORT_AGENT,
    )
    .with_tools(tools);

    let quality_assurance_review = TaskSpec::new(
        QUALITY_ASSURANCE_REVIEW,
        "Review the response drafted by the Senior Support Representative for {customer}'s inquiry. \
         Ensure that the answer is comprehensive, accurate, and adheres to the \
         high-quality standards expected for customer support.\n\
         Verify that all parts of the customer's inquiry have been addressed \
         thoroughly, with a helpful and friendly tone.\n\
         Check for references and sources used to find the information, \
         ensuring the response is well-supported and leaves no questions unanswered.",
        "A final, detailed, and informative response ready to be sent to the customer.\n\
         This response should fully address the customer's inquiry, incorporating all \
         relevant feedback and improvements.\n\
         Don't be too formal, we are a chill and cool company \
         but maintain a professional and friendly tone throughout.",
        QA_AGENT,
    )
    .depends_on(INQUIRY_RESOLUTION);

    vec![inquiry_resolution, quality_assurance_review]
}

pub fn support_crew(tools: Vec<SharedTool>) -> Result<Crew> {
    Ok(Crew::new(support_roles()?, support_tasks(tools)))
}

pub fn default_inputs() -> PipelineContext {
    PipelineContext::new()
        .with("customer", "DeepLearningAI")
        .with("person", "Andrew Ng")
        .with(
            "inquiry",
            "I need help with setting up a Crew and kicking it off, specifically \
             how can I add memory to my crew? Can you provide guidance?",
        )
}
