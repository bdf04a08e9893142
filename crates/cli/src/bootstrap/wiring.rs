use delve_dns_application::Resolver;
use delve_dns_domain::Config;
use delve_dns_infrastructure::dns::ResolverBuilder;

pub fn build_resolver(config: &Config) -> anyhow::Result<Resolver> {
    Ok(ResolverBuilder::new(config.resolver.clone()).build()?)
}
