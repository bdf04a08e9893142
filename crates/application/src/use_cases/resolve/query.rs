use super::resolver::Resolver;
use super::Resolution;
use crate::services::NameServerSet;
use delve_dns_domain::{
    name, Address, DnsRecord, Message, Question, RecordData, RecordType, ResolveError,
    ResponseCode,
};
use rustc_hash::FxHashMap;
use std::net::Ipv4Addr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Where the resolve loop goes after a remote step that did not settle the
/// query.
enum NextHop {
    /// Re-query a CNAME target from its default servers.
    Redirect(String),
    /// Re-query the same name from the referred servers.
    Delegate(NameServerSet),
}

/// State machine for a single resolve call.
pub(crate) struct Query<'a> {
    resolver: &'a Resolver,
    cancel: &'a CancellationToken,
    fqdn: String,
    record_type: RecordType,
    depth: usize,
    result: Message,
}

impl<'a> Query<'a> {
    pub(crate) fn new(
        resolver: &'a Resolver,
        fqdn: &str,
        record_type: RecordType,
        cancel: &'a CancellationToken,
        depth: usize,
    ) -> Self {
        let fqdn = name::normalize(fqdn);
        let result = Message::response_to(&fqdn, record_type, resolver.settings().recursive);

        Self {
            resolver,
            cancel,
            fqdn,
            record_type,
            depth,
            result,
        }
    }

    pub(crate) async fn run(
        mut self,
        nameservers: Option<NameServerSet>,
    ) -> Result<Resolution, ResolveError> {
        let resolver = self.resolver;
        let settings = resolver.settings();
        let mut domain = self.fqdn.clone();
        let mut nameservers = nameservers;
        let mut cname_hops = self.depth;
        let mut referrals = 0;

        let from_cache = loop {
            self.check_cancelled()?;
            if self.query_cache(&domain).await? {
                debug!(domain = %domain, qtype = %self.record_type, "Answered from cache");
                break true;
            }

            self.check_cancelled()?;
            match self.query_remote(&domain, nameservers.take()).await? {
                None => break false,
                Some(NextHop::Redirect(target)) => {
                    cname_hops += 1;
                    if cname_hops > settings.max_cname_hops {
                        return Err(ResolveError::CnameChainTooLong(settings.max_cname_hops));
                    }
                    debug!(from = %domain, to = %target, "Following CNAME");
                    domain = target;
                }
                Some(NextHop::Delegate(servers)) => {
                    referrals += 1;
                    if referrals > settings.max_referrals {
                        return Err(ResolveError::ReferralLimitExceeded(settings.max_referrals));
                    }
                    debug!(domain = %domain, servers = %servers, "Descending delegation");
                    nameservers = Some(servers);
                }
            }
        };

        Ok(Resolution {
            message: self.result,
            from_cache,
        })
    }

    fn check_cancelled(&self) -> Result<(), ResolveError> {
        if self.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        Ok(())
    }

    /// Try to answer `domain` from the cache. Returns whether the domain was
    /// fully answered.
    async fn query_cache(&mut self, domain: &str) -> Result<bool, ResolveError> {
        let resolver = self.resolver;
        let cache = resolver.cache();

        let cnames = cache.query(domain, &[RecordType::CNAME]);
        if !cnames.is_empty() {
            if cnames.iter().all(DnsRecord::is_static) {
                self.result.flags.authoritative = true;
            }
            self.result
                .answers
                .extend(cnames.iter().map(|record| record.rehome(domain)));

            if self.record_type == RecordType::CNAME {
                return Ok(true);
            }

            for target in cnames.iter().filter_map(DnsRecord::target) {
                let sub = resolver
                    .resolve_at_depth(target, self.record_type, None, self.cancel, self.depth + 1)
                    .await?;
                if sub.message.rcode != ResponseCode::NoError {
                    debug!(target = %target, rcode = %sub.message.rcode, "Skipping failed CNAME target");
                    continue;
                }

                let mut message = sub.message;
                self.result.answers.append(&mut message.answers);
                self.result.authority.append(&mut message.authority);
                self.result.additional.append(&mut message.additional);
            }
            return Ok(true);
        }

        let record_types: &[RecordType] = if self.record_type == RecordType::NS {
            &[RecordType::NS]
        } else {
            &[self.record_type, RecordType::NS]
        };

        let mut hit = false;
        let mut all_static = true;
        for record in cache.query(domain, record_types) {
            if record.record_type == RecordType::NS {
                let glue = match record.target() {
                    Some(host) => cache.query(host, &RecordType::ADDRESS_TYPES),
                    None => continue,
                };
                if glue.is_empty() {
                    continue;
                }
                self.result.additional.extend(glue);
                self.result.authority.push(record);
                if self.record_type == RecordType::NS {
                    hit = true;
                }
            } else {
                let satisfies = self.record_type == RecordType::CNAME
                    || record.record_type != RecordType::CNAME;
                all_static &= record.is_static();
                self.result.answers.push(record.rehome(domain));
                hit |= satisfies;
            }
        }

        if hit && all_static && !self.result.answers.is_empty() {
            self.result.flags.authoritative = true;
        }

        if resolver.settings().is_local(domain) {
            self.result.flags.authoritative = true;
            if !hit {
                debug!(domain = %domain, "No local record, answering NXDOMAIN");
                self.result.rcode = ResponseCode::NXDomain;
                hit = true;
            }
        }

        Ok(hit)
    }

    /// One remote step for `domain`: exchange, cache the response and decide
    /// the next hop. `None` means the result is final.
    async fn query_remote(
        &mut self,
        domain: &str,
        nameservers: Option<NameServerSet>,
    ) -> Result<Option<NextHop>, ResolveError> {
        let resolver = self.resolver;
        let settings = resolver.settings();
        let response = self.query_remote_once(domain, nameservers).await?;

        let mut has_result = false;
        let mut has_ns = false;
        let mut cname_target: Option<String> = None;

        for record in &response.answers {
            if let RecordData::Cname(target) = &record.data {
                cname_target.get_or_insert_with(|| target.clone());
            }
            if record.record_type == self.record_type
                || self.record_type == RecordType::CNAME
                || record.record_type != RecordType::CNAME
            {
                has_result = true;
            }
            self.result.answers.push(record.clone());
        }

        for record in &response.authority {
            if !settings.recursive {
                self.result.authority.push(record.clone());
            }
            if record.record_type == RecordType::SOA || self.record_type == RecordType::NS {
                has_result = true;
            } else {
                has_ns = true;
            }
        }

        if !settings.recursive {
            self.result
                .additional
                .extend(response.additional.iter().cloned());
        }

        if has_result {
            if response.rcode.is_error() {
                self.result.rcode = response.rcode;
            }
            return Ok(None);
        }

        if let Some(target) = cname_target {
            return Ok(Some(NextHop::Redirect(target)));
        }

        if !settings.recursive {
            self.result.rcode = response.rcode;
            return Ok(None);
        }

        if !has_ns {
            debug!(domain = %domain, "Response has neither answer nor referral");
            self.result.rcode = ResponseCode::ServFail;
            return Ok(None);
        }

        let glue: FxHashMap<&str, Ipv4Addr> = response
            .additional
            .iter()
            .filter_map(|record| match record.data {
                RecordData::A(ip) => Some((record.name.as_str(), ip)),
                _ => None,
            })
            .collect();

        let servers: Vec<Address> = response
            .authority
            .iter()
            .filter_map(|record| {
                let host = match &record.data {
                    RecordData::Soa(soa) => soa.mname.as_str(),
                    RecordData::Ns(host) => host.as_str(),
                    _ => return None,
                };
                glue.get(host)
                    .map(|ip| Address::new(settings.referral_protocol, ip.to_string(), 53))
            })
            .collect();

        Ok(Some(NextHop::Delegate(NameServerSet::new(servers))))
    }

    async fn query_remote_once(
        &mut self,
        domain: &str,
        nameservers: Option<NameServerSet>,
    ) -> Result<Message, ResolveError> {
        let mut nameservers = nameservers.unwrap_or_else(|| self.resolver.nameservers_for(domain));
        let question = Question::new(domain, self.record_type);

        debug!(
            domain = %domain,
            qtype = %self.record_type,
            servers = %nameservers,
            "Querying remote"
        );

        let response = self.request_remote(&mut nameservers, &question).await?;
        self.resolver.cache().insert_message(&response);
        Ok(response)
    }

    /// Send `question` to the candidates in order until one gives a usable
    /// response.
    async fn request_remote(
        &self,
        nameservers: &mut NameServerSet,
        question: &Question,
    ) -> Result<Message, ResolveError> {
        loop {
            self.check_cancelled()?;
            let addr = nameservers.get().ok_or(ResolveError::NoUsableNameServer)?;

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(ResolveError::Cancelled),
                outcome = self.resolver.deduplicator().query(
                    &question.name,
                    question.record_type,
                    &addr,
                ) => outcome,
            };

            match outcome.and_then(|response| validate_response(question, response)) {
                Ok(response) => {
                    debug!(
                        domain = %question.name,
                        server = %addr,
                        rcode = %response.rcode,
                        answers = response.answers.len(),
                        "Remote response"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_server_failure() => {
                    debug!(server = %addr, error = %e, "Server failed, trying next");
                    nameservers.fail(&addr);
                }
                Err(ResolveError::Protocol(reason)) => {
                    debug!(server = %addr, error = %reason, "Malformed exchange, trying next");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn validate_response(question: &Question, response: Message) -> Result<Message, ResolveError> {
    let actual = response
        .question()
        .map(|q| q.name.as_str())
        .unwrap_or_default();
    if !name::same_name(actual, &question.name) {
        return Err(ResolveError::ProtocolMismatch {
            expected: question.name.clone(),
            actual: actual.to_string(),
        });
    }

    if response.rcode == ResponseCode::ServFail {
        return Err(ResolveError::ServerFailure);
    }

    Ok(response)
}
